//! Status to icon and tooltip mapping.

use buckytray_status::Status;

/// Icon variant shown for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKind {
    Running,
    Stopped,
    Attention,
}

impl IconKind {
    pub fn for_status(status: Status) -> Self {
        match status {
            Status::Running => IconKind::Running,
            Status::Stopped | Status::NotInstall => IconKind::Stopped,
            Status::NotActive | Status::Failed => IconKind::Attention,
        }
    }
}

/// Tooltip text, e.g. `BuckyOS: Running`.
pub fn tooltip(app_name: &str, status: Status) -> String {
    format!("{app_name}: {status}")
}
