//! BuckyOS install layout.

use std::path::{Path, PathBuf};

/// Environment variable overriding the install root.
pub const ROOT_ENV: &str = "BUCKYOS_ROOT";

const IDENTITY_SUFFIX: &str = "_identity.toml";
const NODE_CONFIG_SUFFIX: &str = "_node_config.json";

/// Returns the platform default install root, honouring `BUCKYOS_ROOT`.
pub fn default_root_dir() -> PathBuf {
    if let Ok(root) = std::env::var(ROOT_ENV)
        && !root.is_empty()
    {
        return PathBuf::from(root);
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("buckyos")
    }

    #[cfg(not(target_os = "windows"))]
    {
        PathBuf::from("/opt/buckyos")
    }
}

/// Paths inside one BuckyOS installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuckyPaths {
    root: PathBuf,
}

impl BuckyPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn etc_dir(&self) -> PathBuf {
        self.root.join("etc")
    }

    /// `true` when the system binaries directory exists.
    pub async fn is_installed(&self) -> bool {
        tokio::fs::metadata(self.bin_dir())
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    /// Node config file for `host`.
    pub fn node_config_file(&self, host: &str) -> PathBuf {
        self.etc_dir().join(format!("{host}{NODE_CONFIG_SUFFIX}"))
    }

    /// Node ids with an identity file (`<id>_identity.toml`) in `etc`.
    ///
    /// A missing or unreadable `etc` directory yields no identities.
    pub async fn node_identities(&self) -> Vec<String> {
        let mut ids = Vec::new();
        let Ok(mut entries) = tokio::fs::read_dir(self.etc_dir()).await else {
            return ids;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_suffix(IDENTITY_SUFFIX))
                && !id.is_empty()
            {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        ids
    }
}

/// Local host name used to locate the node config.
pub fn local_host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "localhost".into())
}
