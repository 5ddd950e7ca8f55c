//! Per-scan state machine.
//!
//! A [`ScanSession`] lives from one `start` to the matching `stop`. It is
//! synchronous: the scanner loop feeds it clock ticks and
//! query completions, and it answers with query tickets and status
//! changes.

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::oracle::OracleError;
use crate::status::Status;
use crate::timing::{Debounced, ScanConfig};

/// Identifies one issued query. Completions must hand it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket {
    session: u64,
    seq: u64,
}

impl QueryTicket {
    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// A published status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub new: Status,
    pub old: Status,
}

/// State owned by the scanner for one scan lifetime.
#[derive(Debug, Clone)]
pub struct ScanSession {
    id: u64,
    config: ScanConfig,
    status: Debounced<Status>,
    unstable: bool,
    last_issued: Option<Instant>,
    in_flight: Option<u64>,
    next_seq: u64,
}

impl ScanSession {
    /// Creates a session in the initial `Unstable` / `NotInstall` state.
    pub fn new(id: u64, config: ScanConfig) -> Self {
        Self {
            id,
            config,
            status: Debounced::new(Status::NotInstall),
            unstable: true,
            last_issued: None,
            in_flight: None,
            next_seq: 0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// The last published status.
    pub fn status(&self) -> Status {
        self.status.get()
    }

    pub fn is_unstable(&self) -> bool {
        self.unstable
    }

    /// Issue time of the most recent query.
    pub fn last_issued(&self) -> Option<Instant> {
        self.last_issued
    }

    pub fn is_query_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Handles a clock tick. Returns a ticket when a query should be
    /// issued now; at most one query is outstanding at a time.
    pub fn poll(&mut self, now: Instant) -> Option<QueryTicket> {
        if self.in_flight.is_some() {
            return None;
        }
        if !self.config.is_due(self.last_issued, now, self.unstable) {
            return None;
        }

        self.next_seq += 1;
        self.in_flight = Some(self.next_seq);
        self.last_issued = Some(now);

        Some(QueryTicket {
            session: self.id,
            seq: self.next_seq,
        })
    }

    /// Applies a query completion.
    ///
    /// Success adopts the reported status and clears instability. Failure
    /// marks the session unstable and rotates the displayed status to its
    /// successor. Returns the change when the status actually moved.
    pub fn complete(
        &mut self,
        ticket: QueryTicket,
        outcome: Result<Status, OracleError>,
    ) -> Option<StatusChange> {
        if ticket.session != self.id || self.in_flight != Some(ticket.seq) {
            debug!(
                session = self.id,
                ticket_session = ticket.session,
                ticket_seq = ticket.seq,
                "ignoring completion for a query this session is not waiting on"
            );
            return None;
        }
        self.in_flight = None;

        let candidate = match outcome {
            Ok(reported) => {
                self.unstable = false;
                reported
            }
            Err(e) => {
                warn!(session = self.id, error = %e, "health query failed");
                self.unstable = true;
                self.status.get().next()
            }
        };

        self.status
            .set(candidate)
            .map(|(new, old)| StatusChange { new, old })
    }
}
