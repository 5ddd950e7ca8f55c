//! Pure list-sync state: request sequencing, freshness checks and the
//! single-flight presentation gate.

use tracing::{debug, warn};

use crate::lister::ListError;
use crate::types::{Anchor, AppRecord, AppSnapshot, PopupRequest, Presentation};

/// How a fetch completion was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchVerdict {
    /// Newer than anything accepted so far; it replaced the working
    /// snapshot.
    Accepted { apps: usize },
    /// An equal or newer result was already accepted.
    Stale { highest_accepted: u64 },
    /// The fetch failed; the last good snapshot is kept.
    Failed(ListError),
}

impl FetchVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, FetchVerdict::Accepted { .. })
    }
}

/// State owned by the list-sync loop.
///
/// `request_popup` issues a new tag and arms the gate for one
/// presentation. Every completion, accepted or not, is followed by a
/// presentation attempt; the gate guarantees at most one open menu and at
/// most one presentation per popup request.
#[derive(Debug)]
pub struct ListSync {
    home_page_url: String,
    sequence: u64,
    highest_accepted: u64,
    working: AppSnapshot,
    pending: Option<PopupRequest>,
    menu_open: bool,
}

impl ListSync {
    pub fn new(home_page_url: impl Into<String>) -> Self {
        Self {
            home_page_url: home_page_url.into(),
            sequence: 0,
            highest_accepted: 0,
            working: AppSnapshot::default(),
            pending: None,
            menu_open: false,
        }
    }

    /// Starts a popup request and returns the tag its fetch must carry.
    ///
    /// A newer request replaces any request that has not been presented
    /// yet.
    pub fn request_popup(&mut self, anchor: Anchor, system_running: bool) -> u64 {
        self.sequence += 1;
        let tag = self.sequence;
        self.pending = Some(PopupRequest {
            tag,
            anchor,
            system_running,
        });
        tag
    }

    /// Applies a fetch result tagged `tag`.
    pub fn complete_fetch(
        &mut self,
        tag: u64,
        outcome: Result<Vec<AppRecord>, ListError>,
    ) -> FetchVerdict {
        match outcome {
            Ok(apps) if tag > self.highest_accepted => {
                self.highest_accepted = tag;
                self.working = AppSnapshot::new(tag, apps);
                FetchVerdict::Accepted {
                    apps: self.working.len(),
                }
            }
            Ok(_) => {
                debug!(
                    tag,
                    highest_accepted = self.highest_accepted,
                    "discarding stale application list"
                );
                FetchVerdict::Stale {
                    highest_accepted: self.highest_accepted,
                }
            }
            Err(e) => {
                warn!(tag, error = %e, "application list fetch failed");
                FetchVerdict::Failed(e)
            }
        }
    }

    /// Opens the gate and freezes the working snapshot, unless a menu is
    /// already open or the current request was already presented.
    pub fn present_if_not_already_open(&mut self) -> Option<Presentation> {
        if self.menu_open {
            return None;
        }
        let request = self.pending.take()?;
        self.menu_open = true;
        Some(Presentation {
            request,
            apps: self.working.clone(),
            home_page_url: self.home_page_url.clone(),
        })
    }

    /// Closes the gate after the open menu was dismissed.
    pub fn close_menu(&mut self) {
        self.menu_open = false;
    }

    pub fn working(&self) -> &AppSnapshot {
        &self.working
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn highest_accepted(&self) -> u64 {
        self.highest_accepted
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    /// Returns `true` when a popup request is waiting to be presented.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
