//! Application list refresh and menu presentation for the BuckyOS tray.
//!
//! Every popup request fetches a fresh application list. Fetches are
//! tagged with a monotonically increasing sequence number and a result is
//! only accepted if it is newer than anything accepted before, so a slow
//! old fetch can never overwrite a newer list. Whatever the outcome, the
//! menu is then presented at most once per request, and never while
//! another menu is still open. Selections are resolved against the frozen
//! list the menu was built from.

pub mod actions;
pub mod commands;
pub mod lister;
pub mod presenter;
pub mod state;
pub mod sync;
pub mod types;

pub use actions::{ActionSink, SystemAction};
pub use commands::{AppAction, Dispatch, MenuCommand, MenuIdLayout};
pub use lister::{ApplicationLister, ListError, ListFuture};
pub use presenter::{MenuPresenter, PresentFuture};
pub use state::{FetchVerdict, ListSync};
pub use sync::{AppMenuSync, DEFAULT_HOME_PAGE_URL, MenuEvent, MenuSyncConfig, MenuSyncError};
pub use types::{Anchor, AppRecord, AppSnapshot, PopupRequest, Presentation};
