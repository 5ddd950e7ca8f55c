//! Tray handle, events, and update types.
//!
//! This module defines the channel-based interface that the controller
//! core uses to talk to the tray, independent of the GUI backend. The
//! backend owns the other ends of the channels.

use buckytray_app_menu::{Anchor, MenuCommand};
use buckytray_status::Status;
use tokio::sync::{mpsc, oneshot};

use crate::icon::{IconKind, tooltip};
use crate::menu::{MenuItem, MenuState};
use crate::presenter::TrayPresenter;

/// Configuration for the system tray.
#[derive(Debug, Clone)]
pub struct TrayConfig {
    /// Product name shown in the tooltip.
    pub app_name: String,
    pub menu: MenuState,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            app_name: "BuckyOS".into(),
            menu: MenuState::default(),
        }
    }
}

/// Events emitted by the tray to the controller core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayEvent {
    /// User clicked the icon and wants the context menu at `anchor`.
    PopupRequested { anchor: Anchor },
    /// User asked the tray itself to quit.
    QuitRequested,
}

/// Updates sent from the controller core to the tray.
#[derive(Debug)]
pub enum TrayUpdate {
    /// The displayed status changed.
    StatusChanged {
        status: Status,
        icon: IconKind,
        tooltip: String,
    },
    /// Show a context menu. The backend answers on `reply` once the menu
    /// closes, with the clicked command if any.
    ShowMenu {
        request_tag: u64,
        items: Vec<MenuItem>,
        reply: oneshot::Sender<Option<MenuCommand>>,
    },
    /// Show a short notification, e.g. the About box.
    Notice { title: String, body: String },
    /// Request tray shutdown.
    Shutdown,
}

/// Handle for communicating with the system tray from the controller core.
pub struct TrayHandle {
    config: TrayConfig,
    update_tx: mpsc::UnboundedSender<TrayUpdate>,
    event_rx: mpsc::UnboundedReceiver<TrayEvent>,
    status: Status,
}

impl TrayHandle {
    /// Creates a new tray handle with its channel pair.
    ///
    /// Returns `(handle, event_sender, update_receiver)`; the sender and
    /// receiver belong to the GUI backend. Both work from non-async
    /// threads (`send` and `blocking_recv`).
    pub fn new(
        config: TrayConfig,
    ) -> (
        Self,
        mpsc::UnboundedSender<TrayEvent>,
        mpsc::UnboundedReceiver<TrayUpdate>,
    ) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let handle = Self {
            config,
            update_tx,
            event_rx,
            status: Status::default(),
        };

        (handle, event_tx, update_rx)
    }

    /// Updates the status icon and tooltip.
    pub fn set_status(&mut self, status: Status) {
        self.status = status;
        self.send(TrayUpdate::StatusChanged {
            status,
            icon: IconKind::for_status(status),
            tooltip: tooltip(&self.config.app_name, status),
        });
    }

    /// Shows a notification.
    pub fn notice(&self, title: impl Into<String>, body: impl Into<String>) {
        self.send(TrayUpdate::Notice {
            title: title.into(),
            body: body.into(),
        });
    }

    /// Requests the tray to shut down.
    pub fn shutdown(&self) {
        self.send(TrayUpdate::Shutdown);
    }

    /// Menu presenter that shows menus through this tray.
    pub fn presenter(&self) -> TrayPresenter {
        TrayPresenter::new(self.update_tx.clone(), self.config.menu)
    }

    /// Tries to receive a tray event (non-blocking).
    pub fn try_recv_event(&mut self) -> Option<TrayEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Waits for the next tray event. `None` once the backend is gone.
    pub async fn recv_event(&mut self) -> Option<TrayEvent> {
        self.event_rx.recv().await
    }

    /// Returns the last status sent to the tray.
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn config(&self) -> &TrayConfig {
        &self.config
    }

    fn send(&self, update: TrayUpdate) {
        if self.update_tx.send(update).is_err() {
            tracing::debug!("tray backend gone, dropping update");
        }
    }
}
