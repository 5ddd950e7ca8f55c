//! Application records, snapshots and frozen menu presentations.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// One sub-application of the monitored system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRecord {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon_ref: String,
    #[serde(default)]
    pub home_page_url: String,
    #[serde(default)]
    pub is_running: bool,
}

/// Screen position the menu is anchored at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: i32,
    pub y: i32,
}

impl Anchor {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An accepted application list, tagged with the request that produced it.
///
/// Records are unique by `id`; later duplicates are dropped on
/// construction. Tag `0` means "never fetched".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppSnapshot {
    tag: u64,
    apps: Vec<AppRecord>,
}

impl AppSnapshot {
    pub fn new(tag: u64, apps: Vec<AppRecord>) -> Self {
        let mut seen = HashSet::new();
        let total = apps.len();
        let apps: Vec<AppRecord> = apps
            .into_iter()
            .filter(|app| seen.insert(app.id.clone()))
            .collect();
        if apps.len() != total {
            warn!(
                tag,
                dropped = total - apps.len(),
                "application list contained duplicate ids"
            );
        }
        Self { tag, apps }
    }

    pub fn tag(&self) -> u64 {
        self.tag
    }

    pub fn apps(&self) -> &[AppRecord] {
        &self.apps
    }

    pub fn get(&self, index: usize) -> Option<&AppRecord> {
        self.apps.get(index)
    }

    pub fn find(&self, id: &str) -> Option<&AppRecord> {
        self.apps.iter().find(|app| app.id == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.apps.iter().map(|app| app.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

/// Parameters captured by one popup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupRequest {
    pub tag: u64,
    pub anchor: Anchor,
    pub system_running: bool,
}

/// Everything a visible menu was built from.
///
/// Frozen at the moment the menu opens. Selections are resolved against
/// this copy only, never against a newer working snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub request: PopupRequest,
    pub apps: AppSnapshot,
    pub home_page_url: String,
}
