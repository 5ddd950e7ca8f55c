//! Health oracle backed by the local install directory and process table.

use std::collections::HashSet;

use buckytray_status::{HealthOracle, OracleError, OracleFuture, Status};
use tracing::trace;

use crate::ProbeError;
use crate::paths::BuckyPaths;
use crate::process;

/// Process that only runs on an installed and started node.
pub const NODE_DAEMON: &str = "node_daemon";

/// Kernel processes of a healthy node.
pub const DEFAULT_KERNEL_PROCESSES: &[&str] = &[
    NODE_DAEMON,
    "scheduler",
    "verify_hub",
    "system_config",
    "cyfs_gateway",
];

/// Derives the system status from what is running on this machine.
pub struct ProcessOracle {
    paths: BuckyPaths,
    kernel_processes: Vec<String>,
}

impl ProcessOracle {
    pub fn new(paths: BuckyPaths, kernel_processes: Vec<String>) -> Self {
        let kernel_processes = kernel_processes
            .iter()
            .map(|name| process::normalize_name(name))
            .collect();
        Self {
            paths,
            kernel_processes,
        }
    }

    async fn probe(&self) -> Result<Status, OracleError> {
        if !self.paths.is_installed().await {
            return Ok(Status::NotInstall);
        }

        let running = process::running_process_names()
            .await
            .map_err(|e| match e {
                ProbeError::Process(msg) => OracleError::Enumeration(msg),
                other => OracleError::Unavailable(other.to_string()),
            })?;

        let has_identity = if running.contains(NODE_DAEMON) {
            !self.paths.node_identities().await.is_empty()
        } else {
            false
        };

        let status = classify(true, &running, &self.kernel_processes, has_identity);
        trace!(%status, processes = running.len(), "local probe finished");
        Ok(status)
    }
}

impl HealthOracle for ProcessOracle {
    fn query(&self) -> OracleFuture<'_> {
        Box::pin(self.probe())
    }
}

/// Maps installation state and running processes to a [`Status`].
///
/// - not installed: `NotInstall`
/// - node daemon running: `Running` with a node identity, else `NotActive`
/// - some kernel processes running: `Failed`
/// - none running: `Stopped`
pub fn classify(
    installed: bool,
    running: &HashSet<String>,
    kernel_processes: &[String],
    has_identity: bool,
) -> Status {
    if !installed {
        return Status::NotInstall;
    }
    if running.contains(NODE_DAEMON) {
        return if has_identity {
            Status::Running
        } else {
            Status::NotActive
        };
    }
    if kernel_processes.iter().any(|name| running.contains(name)) {
        Status::Failed
    } else {
        Status::Stopped
    }
}
