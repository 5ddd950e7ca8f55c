//! Action sink running system commands and node-config updates.

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use buckytray_app_menu::ActionSink;
use buckytray_probe::{NodeConfigLister, ProbeError, TargetState};
use tracing::{info, warn};

use crate::config::CommandsSection;

/// Errors from a dispatched action. Logged, never shown in the menu.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("empty command line")]
    EmptyCommand,

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Exit { program: String, status: ExitStatus },

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("failed to open {url}: {source}")]
    Open {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// [`ActionSink`] that spawns a task per action.
pub struct CommandActions {
    commands: CommandsSection,
    node_config: Arc<NodeConfigLister>,
}

impl CommandActions {
    pub fn new(commands: CommandsSection, node_config: Arc<NodeConfigLister>) -> Self {
        Self {
            commands,
            node_config,
        }
    }

    fn spawn_command(&self, action: &'static str, argv: Vec<String>) {
        tokio::spawn(async move {
            match run_command(&argv).await {
                Ok(()) => info!(action, "system command finished"),
                Err(e) => warn!(action, "system command failed: {e}"),
            }
        });
    }

    fn spawn_target_state(&self, app_id: &str, state: TargetState) {
        let node_config = Arc::clone(&self.node_config);
        let app_id = app_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = node_config.set_app_target_state(&app_id, state).await {
                let e = ActionError::from(e);
                warn!(app = %app_id, %state, "failed to update application: {e}");
            }
        });
    }
}

impl ActionSink for CommandActions {
    fn start_system(&self) {
        self.spawn_command("start_system", self.commands.start_system.clone());
    }

    fn stop_system(&self) {
        self.spawn_command("stop_system", self.commands.stop_system.clone());
    }

    fn start_app(&self, app_id: &str) {
        self.spawn_target_state(app_id, TargetState::Running);
    }

    fn stop_app(&self, app_id: &str) {
        self.spawn_target_state(app_id, TargetState::Stopped);
    }

    fn open_url(&self, url: &str) {
        if let Err(e) = open_url(url) {
            warn!("{e}");
        }
    }
}

/// Runs `argv` to completion with no terminal attached.
pub async fn run_command(argv: &[String]) -> Result<(), ActionError> {
    let (program, args) = argv.split_first().ok_or(ActionError::EmptyCommand)?;
    let status = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|source| ActionError::Spawn {
            program: program.clone(),
            source,
        })?;

    if !status.success() {
        return Err(ActionError::Exit {
            program: program.clone(),
            status,
        });
    }
    Ok(())
}

fn open_url(url: &str) -> Result<(), ActionError> {
    open::that_detached(url).map_err(|source| ActionError::Open {
        url: url.to_string(),
        source,
    })
}
