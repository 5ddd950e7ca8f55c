//! Displayed health status of the monitored system.

use std::fmt;

/// Last-known health of BuckyOS as derived by the scanner.
///
/// The member order is significant: a failed query advances the displayed
/// value to [`Status::next`], cycling through every member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// Kernel services are up and the node is activated.
    Running,
    /// Installed, but no kernel service is running.
    Stopped,
    /// The node daemon runs but the node has no identity yet.
    NotActive,
    /// No installation found.
    #[default]
    NotInstall,
    /// Some kernel services run while others are missing.
    Failed,
}

impl Status {
    /// All members in successor order.
    pub const ALL: [Status; 5] = [
        Status::Running,
        Status::Stopped,
        Status::NotActive,
        Status::NotInstall,
        Status::Failed,
    ];

    /// Position of this member in [`Status::ALL`].
    pub fn index(self) -> usize {
        match self {
            Status::Running => 0,
            Status::Stopped => 1,
            Status::NotActive => 2,
            Status::NotInstall => 3,
            Status::Failed => 4,
        }
    }

    /// Cyclic successor, `(index + 1) mod ALL.len()`.
    pub fn next(self) -> Status {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Short human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Status::Running => "Running",
            Status::Stopped => "Stopped",
            Status::NotActive => "Not activated",
            Status::NotInstall => "Not installed",
            Status::Failed => "Failed",
        }
    }

    /// Whether the system counts as running for start/stop toggling.
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running | Status::NotActive)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
