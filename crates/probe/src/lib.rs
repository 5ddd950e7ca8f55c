//! Local machine probes for the BuckyOS tray.
//!
//! - [`ProcessOracle`]: health status derived from the install directory
//!   and the running kernel processes.
//! - [`NodeConfigLister`]: application list read from the node
//!   configuration file.

pub mod node_config;
pub mod oracle;
pub mod paths;
pub mod process;

pub use node_config::{NodeConfigLister, TargetState};
pub use oracle::{DEFAULT_KERNEL_PROCESSES, NODE_DAEMON, ProcessOracle, classify};
pub use paths::{BuckyPaths, default_root_dir, local_host_name};

/// Errors for local probe operations.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("process enumeration failed: {0}")]
    Process(String),

    #[error("unsupported platform")]
    Unsupported,

    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid node config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("application not found: {0}")]
    AppNotFound(String),
}

impl ProbeError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        ProbeError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
