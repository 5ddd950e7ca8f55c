//! System tray interface for the BuckyOS tray controller.
//!
//! The tray shows the system status as an icon and opens a context menu
//! with the node home page, one submenu per application, a start/stop
//! toggle, About and Exit.
//!
//! The tray communicates with the controller core via channels:
//! - [`TrayEvent`]: events from tray to core (popup clicked, quit)
//! - [`TrayUpdate`]: updates from core to tray (status icon, menu to show)
//!
//! # Platform notes
//! - The GUI backend owns the receiving end of [`TrayUpdate`] and must run
//!   on the main thread on some platforms.
//! - Numeric-id backends map clicks back with [`MenuState::command_for_id`].

mod icon;
mod menu;
mod presenter;
mod tray;

pub use icon::{IconKind, tooltip};
pub use menu::{MenuItem, MenuState};
pub use presenter::TrayPresenter;
pub use tray::{TrayConfig, TrayEvent, TrayHandle, TrayUpdate};
