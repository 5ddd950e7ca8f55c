//! Application list backed by the node configuration file.
//!
//! The node config is a JSON document with an `apps` object keyed by
//! application id:
//!
//! ```json
//! { "apps": { "files": { "target_state": "Running", "app_id": "files" } } }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use buckytray_app_menu::{AppRecord, ApplicationLister, ListError, ListFuture};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ProbeError;

/// Desired run state of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetState {
    Running,
    Stopped,
}

impl TargetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetState::Running => "Running",
            TargetState::Stopped => "Stopped",
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct NodeConfigFile {
    #[serde(default)]
    apps: BTreeMap<String, AppEntry>,
}

#[derive(Debug, Deserialize)]
struct AppEntry {
    #[serde(default)]
    target_state: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    home_page_url: Option<String>,
}

/// Parses the `apps` object of a node config into records sorted by id.
///
/// Entries without their own home page link to `node_home_page`.
pub fn parse_apps(json: &str, node_home_page: &str) -> Result<Vec<AppRecord>, serde_json::Error> {
    let config: NodeConfigFile = serde_json::from_str(json)?;
    Ok(config
        .apps
        .into_iter()
        .map(|(id, entry)| AppRecord {
            display_name: entry.display_name.unwrap_or_else(|| id.clone()),
            icon_ref: entry.icon.unwrap_or_default(),
            home_page_url: entry
                .home_page_url
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| node_home_page.to_string()),
            is_running: entry.target_state == TargetState::Running.as_str(),
            id,
        })
        .collect())
}

/// Lists applications from a node config file on disk.
pub struct NodeConfigLister {
    path: PathBuf,
    home_page_url: String,
}

impl NodeConfigLister {
    pub fn new(path: impl Into<PathBuf>, home_page_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            home_page_url: home_page_url.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_apps(&self) -> Result<Vec<AppRecord>, ListError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ListError::Unavailable(format!("{}: {e}", self.path.display())))?;
        let apps = parse_apps(&content, &self.home_page_url)
            .map_err(|e| ListError::Invalid(e.to_string()))?;
        debug!(path = %self.path.display(), apps = apps.len(), "node config read");
        Ok(apps)
    }

    /// Sets `apps.<app_id>.target_state`, leaving the rest of the document
    /// untouched.
    pub async fn set_app_target_state(
        &self,
        app_id: &str,
        state: TargetState,
    ) -> Result<(), ProbeError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ProbeError::io(&self.path, e))?;
        let mut doc: serde_json::Value = serde_json::from_str(&content)?;

        let entry = doc
            .get_mut("apps")
            .and_then(|apps| apps.get_mut(app_id))
            .and_then(|entry| entry.as_object_mut())
            .ok_or_else(|| ProbeError::AppNotFound(app_id.to_string()))?;
        entry.insert(
            "target_state".into(),
            serde_json::Value::String(state.as_str().into()),
        );

        let out = serde_json::to_string_pretty(&doc)?;
        replace_file(&self.path, out.as_bytes()).await?;

        info!(app = app_id, %state, "application target state updated");
        Ok(())
    }
}

/// Writes `contents` next to `path` and renames it over `path`, so readers
/// see either the old file or the new one.
async fn replace_file(path: &Path, contents: &[u8]) -> Result<(), ProbeError> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    tokio::fs::write(&temp_path, contents)
        .await
        .map_err(|e| ProbeError::io(&temp_path, e))?;
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(ProbeError::io(path, e));
    }
    Ok(())
}

impl ApplicationLister for NodeConfigLister {
    fn list(&self) -> ListFuture<'_> {
        Box::pin(self.read_apps())
    }
}
