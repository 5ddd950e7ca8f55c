//! Async status scanner driving a [`ScanSession`] from a tokio task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::oracle::{HealthOracle, OracleError};
use crate::session::{QueryTicket, ScanSession};
use crate::status::Status;
use crate::timing::ScanConfig;

/// Callback invoked with `(new, old)` on every status change.
pub type StatusChangeFn = Box<dyn Fn(Status, Status) + Send + Sync + 'static>;

/// Polls a [`HealthOracle`] and publishes a debounced [`Status`].
///
/// Each `start` spawns a loop task that owns a fresh [`ScanSession`]. Ticks
/// and query completions are both handled inside that task, so session
/// state is never shared. Queries run in their own tasks and report back
/// through a weak handle to the loop; once the loop is gone their results
/// are dropped.
pub struct StatusScanner {
    oracle: Arc<dyn HealthOracle>,
    config: ScanConfig,
    status_tx: Arc<watch::Sender<Status>>,
    status_rx: watch::Receiver<Status>,
    inner: Mutex<ScannerInner>,
}

struct ScannerInner {
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
    sessions: u64,
}

/// Completion message sent from a query task back to the loop.
struct QueryDone {
    ticket: QueryTicket,
    outcome: Result<Status, OracleError>,
}

impl StatusScanner {
    /// Creates an idle scanner.
    pub fn new(oracle: Arc<dyn HealthOracle>, config: ScanConfig) -> Self {
        let (status_tx, status_rx) = watch::channel(Status::NotInstall);
        Self {
            oracle,
            config,
            status_tx: Arc::new(status_tx),
            status_rx,
            inner: Mutex::new(ScannerInner {
                cancel: None,
                task: None,
                sessions: 0,
            }),
        }
    }

    /// Starts polling with a fresh session.
    ///
    /// Any running scan is stopped first; its pending callbacks never fire.
    /// The published status resets to [`Status::NotInstall`] without
    /// notifying `on_change`.
    pub async fn start(&self, on_change: StatusChangeFn) {
        let mut inner = self.inner.lock().await;
        halt(&mut inner).await;

        inner.sessions += 1;
        let session = ScanSession::new(inner.sessions, self.config.clone());
        let session_id = session.id();
        self.status_tx.send_replace(session.status());

        let cancel = CancellationToken::new();
        inner.cancel = Some(cancel.clone());

        let oracle = Arc::clone(&self.oracle);
        let status_tx = Arc::clone(&self.status_tx);
        inner.task = Some(tokio::spawn(async move {
            scan_loop(session, oracle, on_change, status_tx, cancel).await;
        }));

        info!(
            session = session_id,
            base_tick_ms = self.config.base_tick.as_millis() as u64,
            "status scanner started"
        );
    }

    /// Stops polling. Safe to call when already stopped.
    ///
    /// Returns once the loop task has exited, so no callback fires after
    /// this returns.
    pub async fn stop(&self) {
        let mut inner = self.inner.lock().await;
        if halt(&mut inner).await {
            info!("status scanner stopped");
        }
    }

    /// Returns `true` while a scan is active.
    pub async fn is_running(&self) -> bool {
        self.inner.lock().await.cancel.is_some()
    }

    /// The last published status. Never blocks.
    pub fn current_status(&self) -> Status {
        *self.status_rx.borrow()
    }

    /// Watch channel following every published status.
    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.status_rx.clone()
    }
}

/// Cancels and joins the active loop. Returns `true` if one was running.
async fn halt(inner: &mut ScannerInner) -> bool {
    let Some(cancel) = inner.cancel.take() else {
        return false;
    };
    cancel.cancel();
    if let Some(task) = inner.task.take() {
        let _ = task.await;
    }
    true
}

/// Main scan loop: one session, one base ticker.
async fn scan_loop(
    mut session: ScanSession,
    oracle: Arc<dyn HealthOracle>,
    on_change: StatusChangeFn,
    status_tx: Arc<watch::Sender<Status>>,
    cancel: CancellationToken,
) {
    let (done_tx, mut done_rx) = mpsc::channel::<QueryDone>(4);
    let query_timeout = session.config().query_timeout;

    let mut ticker = tokio::time::interval(session.config().base_tick);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            Some(done) = done_rx.recv() => {
                if let Some(change) = session.complete(done.ticket, done.outcome) {
                    status_tx.send_replace(change.new);
                    info!(
                        session = session.id(),
                        new = %change.new,
                        old = %change.old,
                        "status changed"
                    );
                    on_change(change.new, change.old);
                }
            }
            now = ticker.tick() => {
                if let Some(ticket) = session.poll(now) {
                    trace!(
                        session = session.id(),
                        seq = ticket.seq(),
                        unstable = session.is_unstable(),
                        "issuing health query"
                    );
                    spawn_query(ticket, Arc::clone(&oracle), query_timeout, done_tx.downgrade());
                }
            }
        }
    }
}

/// Runs one query in its own task and hands the outcome back to the loop
/// if the loop still exists.
fn spawn_query(
    ticket: QueryTicket,
    oracle: Arc<dyn HealthOracle>,
    timeout: Duration,
    owner: mpsc::WeakSender<QueryDone>,
) {
    tokio::spawn(async move {
        let outcome = match tokio::time::timeout(timeout, oracle.query()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(OracleError::Timeout(timeout)),
        };

        let Some(tx) = owner.upgrade() else {
            debug!(
                session = ticket.session(),
                seq = ticket.seq(),
                "scan ended, dropping query result"
            );
            return;
        };
        let _ = tx.send(QueryDone { ticket, outcome }).await;
    });
}
