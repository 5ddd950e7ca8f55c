//! Running process enumeration.

use std::collections::HashSet;

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

use crate::ProbeError;

/// Returns the normalized names of all running processes.
///
/// The process table scan is blocking, so it runs on the blocking pool.
pub async fn running_process_names() -> Result<HashSet<String>, ProbeError> {
    if !sysinfo::IS_SUPPORTED_SYSTEM {
        return Err(ProbeError::Unsupported);
    }
    tokio::task::spawn_blocking(scan_process_table)
        .await
        .map_err(|e| ProbeError::Process(format!("process scan task failed: {e}")))
}

fn scan_process_table() -> HashSet<String> {
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::nothing(),
    );
    collect_names(
        system
            .processes()
            .values()
            .map(|process| process.name().to_string_lossy()),
    )
}

/// Normalizes raw process names, dropping empty ones.
pub fn collect_names<I, S>(raw: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .map(|name| normalize_name(name.as_ref()))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Lower-cases a process name and strips any directory and `.exe` suffix.
pub fn normalize_name(raw: &str) -> String {
    let raw = raw.trim();
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let lower = base.to_ascii_lowercase();
    match lower.strip_suffix(".exe") {
        Some(stem) => stem.to_string(),
        None => lower,
    }
}
