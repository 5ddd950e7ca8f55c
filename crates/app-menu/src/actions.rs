//! Action sink boundary.

/// Fire-and-forget operations on the monitored system.
///
/// Implementations must not block: long-running work belongs in a spawned
/// task. Nothing is returned to the menu.
pub trait ActionSink: Send + Sync {
    fn start_system(&self);
    fn stop_system(&self);
    fn start_app(&self, app_id: &str);
    fn stop_app(&self, app_id: &str);
    fn open_url(&self, url: &str);
}

/// A system-level action produced by a resolved menu selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemAction {
    StartSystem,
    StopSystem,
    StartApp(String),
    StopApp(String),
    OpenUrl(String),
}

impl SystemAction {
    /// Forwards the action to `sink`.
    pub fn apply(&self, sink: &dyn ActionSink) {
        match self {
            SystemAction::StartSystem => sink.start_system(),
            SystemAction::StopSystem => sink.stop_system(),
            SystemAction::StartApp(id) => sink.start_app(id),
            SystemAction::StopApp(id) => sink.stop_app(id),
            SystemAction::OpenUrl(url) => sink.open_url(url),
        }
    }
}
