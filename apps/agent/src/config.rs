//! Tray controller configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/buckytray/tray.toml`
//! - Windows: `%APPDATA%/buckytray/tray.toml`
//!
//! `BUCKYTRAY_CONFIG` overrides the location.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use buckytray_app_menu::{DEFAULT_HOME_PAGE_URL, MenuIdLayout, MenuSyncConfig};
use buckytray_probe::{BuckyPaths, DEFAULT_KERNEL_PROCESSES, default_root_dir, local_host_name};
use buckytray_status::ScanConfig;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the configuration file path.
pub const CONFIG_ENV: &str = "BUCKYTRAY_CONFIG";

/// Tray controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// BuckyOS install root.
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// Log filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Node home page opened from the menu.
    #[serde(default = "default_home_page_url")]
    pub home_page_url: String,

    /// Node config file; derived from the host name when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_config_path: Option<PathBuf>,

    /// Process names that make up a running node.
    #[serde(default = "default_kernel_processes")]
    pub kernel_processes: Vec<String>,

    #[serde(default)]
    pub scan: ScanSection,

    #[serde(default)]
    pub menu: MenuSection,

    #[serde(default)]
    pub commands: CommandsSection,
}

/// Status polling timings, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSection {
    #[serde(default = "default_base_tick_ms")]
    pub base_tick_ms: u64,
    #[serde(default = "default_unstable_interval_ms")]
    pub unstable_interval_ms: u64,
    #[serde(default = "default_stable_interval_ms")]
    pub stable_interval_ms: u64,
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

/// Application menu settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuSection {
    #[serde(default = "default_list_timeout_ms")]
    pub list_timeout_ms: u64,
    /// First numeric id handed to menu backends.
    #[serde(default = "default_id_base")]
    pub id_base: u32,
}

/// Commands run for the system start/stop entries, as argv lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandsSection {
    #[serde(default = "default_start_system")]
    pub start_system: Vec<String>,
    #[serde(default = "default_stop_system")]
    pub stop_system: Vec<String>,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_home_page_url() -> String {
    DEFAULT_HOME_PAGE_URL.into()
}

fn default_kernel_processes() -> Vec<String> {
    DEFAULT_KERNEL_PROCESSES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_base_tick_ms() -> u64 {
    500
}

fn default_unstable_interval_ms() -> u64 {
    1000
}

fn default_stable_interval_ms() -> u64 {
    3000
}

fn default_query_timeout_ms() -> u64 {
    3000
}

fn default_list_timeout_ms() -> u64 {
    500
}

fn default_id_base() -> u32 {
    MenuIdLayout::default().base
}

fn service_command(verb: &str) -> Vec<String> {
    #[cfg(target_os = "windows")]
    let argv = ["net", verb, "buckyos"];

    #[cfg(not(target_os = "windows"))]
    let argv = ["systemctl", verb, "buckyos"];

    argv.iter().map(|s| s.to_string()).collect()
}

fn default_start_system() -> Vec<String> {
    service_command("start")
}

fn default_stop_system() -> Vec<String> {
    service_command("stop")
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            base_tick_ms: default_base_tick_ms(),
            unstable_interval_ms: default_unstable_interval_ms(),
            stable_interval_ms: default_stable_interval_ms(),
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

impl Default for MenuSection {
    fn default() -> Self {
        Self {
            list_timeout_ms: default_list_timeout_ms(),
            id_base: default_id_base(),
        }
    }
}

impl Default for CommandsSection {
    fn default() -> Self {
        Self {
            start_system: default_start_system(),
            stop_system: default_stop_system(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            log_level: default_log_level(),
            home_page_url: default_home_page_url(),
            node_config_path: None,
            kernel_processes: default_kernel_processes(),
            scan: ScanSection::default(),
            menu: MenuSection::default(),
            commands: CommandsSection::default(),
        }
    }
}

impl Config {
    /// Loads configuration from disk, or creates a default if not found.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path())
    }

    /// Loads configuration from `path`, creating it with defaults if missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?
        } else {
            let config = Config::default();
            config.save_to(path)?;
            config
        };
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        // Restrict permissions on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Rejects values the runtime cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.scan.base_tick_ms == 0 {
            bail!("scan.base_tick_ms must be greater than zero");
        }
        if self.commands.start_system.is_empty() || self.commands.stop_system.is_empty() {
            bail!("commands.start_system and commands.stop_system must not be empty");
        }
        if self.menu.id_base > MenuIdLayout::MAX_BASE {
            bail!(
                "menu.id_base must be at most {} to leave room for menu entries",
                MenuIdLayout::MAX_BASE
            );
        }
        Ok(())
    }

    pub fn paths(&self) -> BuckyPaths {
        BuckyPaths::new(&self.root_dir)
    }

    /// Node config file, explicit or `<root>/etc/<host>_node_config.json`.
    pub fn node_config_file(&self) -> PathBuf {
        match &self.node_config_path {
            Some(path) => path.clone(),
            None => self.paths().node_config_file(&local_host_name()),
        }
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            base_tick: Duration::from_millis(self.scan.base_tick_ms),
            unstable_interval: Duration::from_millis(self.scan.unstable_interval_ms),
            stable_interval: Duration::from_millis(self.scan.stable_interval_ms),
            query_timeout: Duration::from_millis(self.scan.query_timeout_ms),
        }
    }

    pub fn menu_sync_config(&self) -> MenuSyncConfig {
        MenuSyncConfig {
            home_page_url: self.home_page_url.clone(),
            list_timeout: Duration::from_millis(self.menu.list_timeout_ms),
        }
    }

    pub fn id_layout(&self) -> MenuIdLayout {
        MenuIdLayout::new(self.menu.id_base)
    }
}

/// Returns the configuration file path, honouring `BUCKYTRAY_CONFIG`.
fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        return PathBuf::from(path);
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("buckytray").join("tray.toml")
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home)
            .join(".config")
            .join("buckytray")
            .join("tray.toml")
    }
}
