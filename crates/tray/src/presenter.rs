//! Menu presenter that renders through the tray backend.

use buckytray_app_menu::{MenuPresenter, PresentFuture, Presentation};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::menu::MenuState;
use crate::tray::TrayUpdate;

/// Sends each presentation to the tray backend as a
/// [`TrayUpdate::ShowMenu`] and resolves when the backend replies.
///
/// A backend that drops the reply, or is gone altogether, counts as a
/// dismissed menu.
#[derive(Clone)]
pub struct TrayPresenter {
    update_tx: mpsc::UnboundedSender<TrayUpdate>,
    menu: MenuState,
}

impl TrayPresenter {
    pub(crate) fn new(update_tx: mpsc::UnboundedSender<TrayUpdate>, menu: MenuState) -> Self {
        Self { update_tx, menu }
    }
}

impl MenuPresenter for TrayPresenter {
    fn present(&self, presentation: &Presentation) -> PresentFuture {
        let (reply, selection) = oneshot::channel();
        let request_tag = presentation.request.tag;
        let update = TrayUpdate::ShowMenu {
            request_tag,
            items: self.menu.build_menu(presentation),
            reply,
        };
        if self.update_tx.send(update).is_err() {
            debug!(request_tag, "tray backend gone, menu not shown");
        }
        Box::pin(async move { selection.await.ok().flatten() })
    }
}
