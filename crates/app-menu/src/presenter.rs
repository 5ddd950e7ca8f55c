//! Menu presentation boundary.

use std::future::Future;
use std::pin::Pin;

use crate::commands::MenuCommand;
use crate::types::Presentation;

/// Resolves when the menu is dismissed, with the selected entry if any.
pub type PresentFuture = Pin<Box<dyn Future<Output = Option<MenuCommand>> + Send + 'static>>;

/// Renders a menu for a frozen [`Presentation`].
///
/// `present` must return immediately; the menu stays open until the
/// returned future resolves. The caller keeps serving completions while a
/// menu is open.
pub trait MenuPresenter: Send + Sync {
    fn present(&self, presentation: &Presentation) -> PresentFuture;
}
