//! Async driver for [`ListSync`]: fetch tasks, menu lifetime and
//! selection dispatch.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::actions::ActionSink;
use crate::commands::{Dispatch, MenuCommand};
use crate::lister::{ApplicationLister, ListError};
use crate::presenter::{MenuPresenter, PresentFuture};
use crate::state::{FetchVerdict, ListSync};
use crate::types::{Anchor, AppRecord, AppSnapshot, Presentation};

/// Default URL of the node home page.
pub const DEFAULT_HOME_PAGE_URL: &str = "http://127.0.0.1:3180/index.html";

/// Driver settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSyncConfig {
    pub home_page_url: String,
    /// Upper bound for one list call; a slower call counts as failed.
    pub list_timeout: Duration,
}

impl Default for MenuSyncConfig {
    fn default() -> Self {
        Self {
            home_page_url: DEFAULT_HOME_PAGE_URL.into(),
            list_timeout: Duration::from_millis(500),
        }
    }
}

/// Errors returned by the [`AppMenuSync`] handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MenuSyncError {
    #[error("menu sync has shut down")]
    Closed,
}

/// Observable progress of the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    /// A fetch completed and was judged.
    FetchSettled { tag: u64, verdict: FetchVerdict },
    /// A menu was opened for popup request `request_tag`.
    Presented { request_tag: u64, apps: usize },
    /// The open menu returned a selection that resolved against its
    /// presentation. `Action` dispatches were already forwarded to the
    /// action sink.
    Selected { request_tag: u64, dispatch: Dispatch },
    /// The open menu closed without a usable selection.
    Dismissed { request_tag: u64 },
}

struct PopupCommand {
    anchor: Anchor,
    system_running: bool,
}

struct FetchDone {
    tag: u64,
    outcome: Result<Vec<AppRecord>, ListError>,
}

struct OpenMenu {
    presentation: Presentation,
    selection: PresentFuture,
}

/// Handle to a running list-sync loop.
///
/// The loop task owns the [`ListSync`] state. Fetches run in their own
/// tasks and report back through a weak handle, so a completion that
/// arrives after [`shutdown`](Self::shutdown) is dropped without touching
/// any state.
pub struct AppMenuSync {
    commands: mpsc::Sender<PopupCommand>,
    events_rx: Option<mpsc::Receiver<MenuEvent>>,
    snapshot_rx: watch::Receiver<AppSnapshot>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AppMenuSync {
    /// Spawns the loop on the current runtime.
    pub fn spawn(
        lister: Arc<dyn ApplicationLister>,
        presenter: Arc<dyn MenuPresenter>,
        sink: Arc<dyn ActionSink>,
        config: MenuSyncConfig,
    ) -> Self {
        let (commands_tx, commands_rx) = mpsc::channel(16);
        let (events_tx, events_rx) = mpsc::channel(64);
        let (snapshot_tx, snapshot_rx) = watch::channel(AppSnapshot::default());
        let cancel = CancellationToken::new();

        let ctx = LoopContext {
            state: ListSync::new(config.home_page_url),
            lister,
            presenter,
            sink,
            list_timeout: config.list_timeout,
            events_tx,
            snapshot_tx,
        };
        let task = tokio::spawn(sync_loop(ctx, commands_rx, cancel.clone()));

        Self {
            commands: commands_tx,
            events_rx: Some(events_rx),
            snapshot_rx,
            cancel,
            task: Mutex::new(Some(task)),
        }
    }

    /// Requests a menu at `anchor`, refreshing the application list first.
    pub async fn request_popup(
        &self,
        anchor: Anchor,
        system_running: bool,
    ) -> Result<(), MenuSyncError> {
        if self.cancel.is_cancelled() {
            return Err(MenuSyncError::Closed);
        }
        self.commands
            .send(PopupCommand {
                anchor,
                system_running,
            })
            .await
            .map_err(|_| MenuSyncError::Closed)
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<MenuEvent>> {
        self.events_rx.take()
    }

    /// The latest accepted application list.
    pub fn working_snapshot(&self) -> AppSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Watch channel following every accepted application list.
    pub fn subscribe_snapshot(&self) -> watch::Receiver<AppSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Stops the loop and waits for it to exit. Idempotent.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(task) = self.task.lock().await.take() {
            let _ = task.await;
            info!("menu sync shut down");
        }
    }
}

impl Drop for AppMenuSync {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct LoopContext {
    state: ListSync,
    lister: Arc<dyn ApplicationLister>,
    presenter: Arc<dyn MenuPresenter>,
    sink: Arc<dyn ActionSink>,
    list_timeout: Duration,
    events_tx: mpsc::Sender<MenuEvent>,
    snapshot_tx: watch::Sender<AppSnapshot>,
}

impl LoopContext {
    fn emit(&self, event: MenuEvent) {
        if let Err(e) = self.events_tx.try_send(event) {
            warn!("failed to deliver menu event: {e}");
        }
    }

    fn on_popup(&mut self, cmd: PopupCommand, done: &mpsc::Sender<FetchDone>) {
        let tag = self.state.request_popup(cmd.anchor, cmd.system_running);
        debug!(tag, "fetching application list");
        spawn_fetch(
            tag,
            Arc::clone(&self.lister),
            self.list_timeout,
            done.downgrade(),
        );
    }

    fn on_fetch(&mut self, done: FetchDone) -> Option<OpenMenu> {
        let verdict = self.state.complete_fetch(done.tag, done.outcome);
        if verdict.is_accepted() {
            self.snapshot_tx.send_replace(self.state.working().clone());
        }
        self.emit(MenuEvent::FetchSettled {
            tag: done.tag,
            verdict,
        });

        let presentation = self.state.present_if_not_already_open()?;
        let request_tag = presentation.request.tag;
        let apps = presentation.apps.len();
        let selection = self.presenter.present(&presentation);
        info!(request_tag, apps, "menu presented");
        self.emit(MenuEvent::Presented { request_tag, apps });
        Some(OpenMenu {
            presentation,
            selection,
        })
    }

    fn on_dismissed(&mut self, menu: OpenMenu, selection: Option<MenuCommand>) {
        self.state.close_menu();
        let request_tag = menu.presentation.request.tag;

        let dispatch = selection.and_then(|cmd| {
            let resolved = menu.presentation.resolve(cmd);
            if resolved.is_none() {
                debug!(request_tag, ?cmd, "selection does not resolve against menu");
            }
            resolved
        });

        match dispatch {
            Some(dispatch) => {
                if let Dispatch::Action(action) = &dispatch {
                    debug!(request_tag, ?action, "dispatching menu action");
                    action.apply(self.sink.as_ref());
                }
                self.emit(MenuEvent::Selected {
                    request_tag,
                    dispatch,
                });
            }
            None => self.emit(MenuEvent::Dismissed { request_tag }),
        }
    }
}

async fn sync_loop(
    mut ctx: LoopContext,
    mut commands: mpsc::Receiver<PopupCommand>,
    cancel: CancellationToken,
) {
    let (done_tx, mut done_rx) = mpsc::channel::<FetchDone>(16);
    let mut open: Option<OpenMenu> = None;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            selection = wait_selection(&mut open) => {
                if let Some(menu) = open.take() {
                    ctx.on_dismissed(menu, selection);
                }
            }
            cmd = commands.recv() => match cmd {
                Some(cmd) => ctx.on_popup(cmd, &done_tx),
                None => break,
            },
            Some(done) = done_rx.recv() => {
                if let Some(menu) = ctx.on_fetch(done) {
                    open = Some(menu);
                }
            }
        }
    }
}

/// Resolves with the open menu's selection; pending while no menu is open.
async fn wait_selection(open: &mut Option<OpenMenu>) -> Option<MenuCommand> {
    match open {
        Some(menu) => (&mut menu.selection).await,
        None => std::future::pending().await,
    }
}

fn spawn_fetch(
    tag: u64,
    lister: Arc<dyn ApplicationLister>,
    timeout: Duration,
    owner: mpsc::WeakSender<FetchDone>,
) {
    tokio::spawn(async move {
        let outcome = match tokio::time::timeout(timeout, lister.list()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ListError::Timeout(timeout)),
        };

        let Some(tx) = owner.upgrade() else {
            debug!(tag, "menu sync gone, dropping application list");
            return;
        };
        let _ = tx.send(FetchDone { tag, outcome }).await;
    });
}
