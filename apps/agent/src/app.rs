//! Application orchestrator: wires scanner, menu sync and tray together.

use std::sync::Arc;

use buckytray_app_menu::{AppMenuSync, Dispatch, MenuEvent};
use buckytray_probe::{NodeConfigLister, ProcessOracle};
use buckytray_status::{Status, StatusScanner};
use buckytray_tray::{MenuState, TrayConfig, TrayEvent, TrayHandle, TrayUpdate};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::actions::CommandActions;
use crate::config::Config;

const ABOUT_TITLE: &str = "BuckyOS";

/// Runs the tray controller until shutdown is requested.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let node_config = Arc::new(NodeConfigLister::new(
        config.node_config_file(),
        config.home_page_url.clone(),
    ));
    info!(path = %node_config.path().display(), "reading applications from node config");

    // -- Tray --
    let tray_config = TrayConfig {
        menu: MenuState::new(config.id_layout()),
        ..TrayConfig::default()
    };
    let (mut tray, _event_tx, update_rx) = TrayHandle::new(tray_config);
    // No GUI backend is linked in; updates are logged and menus dismissed.
    let backend = tokio::spawn(headless_backend(update_rx));

    // -- Status scanner --
    let oracle = Arc::new(ProcessOracle::new(
        config.paths(),
        config.kernel_processes.clone(),
    ));
    let scanner = StatusScanner::new(oracle, config.scan_config());
    let (status_tx, mut status_rx) = mpsc::unbounded_channel::<Status>();
    scanner
        .start(Box::new(move |new, _old| {
            let _ = status_tx.send(new);
        }))
        .await;
    tray.set_status(scanner.current_status());

    // -- Application menu --
    let actions = Arc::new(CommandActions::new(
        config.commands.clone(),
        Arc::clone(&node_config),
    ));
    let mut menu = AppMenuSync::spawn(
        node_config,
        Arc::new(tray.presenter()),
        actions,
        config.menu_sync_config(),
    );
    let mut menu_events = menu
        .take_events()
        .ok_or_else(|| anyhow::anyhow!("menu events already taken"))?;

    info!("tray controller ready");

    // -- Main loop: wait for shutdown --
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("SIGINT received, shutting down");
                break;
            }
            Some(status) = status_rx.recv() => tray.set_status(status),
            event = tray.recv_event() => match event {
                Some(TrayEvent::PopupRequested { anchor }) => {
                    let running = scanner.current_status().is_running();
                    if let Err(e) = menu.request_popup(anchor, running).await {
                        warn!("cannot open menu: {e}");
                    }
                }
                Some(TrayEvent::QuitRequested) | None => {
                    info!("quit requested via tray");
                    break;
                }
            },
            Some(event) = menu_events.recv() => match event {
                MenuEvent::Selected { dispatch: Dispatch::Exit, .. } => {
                    info!("exit selected from menu");
                    break;
                }
                MenuEvent::Selected { dispatch: Dispatch::About, .. } => {
                    tray.notice(ABOUT_TITLE, about_text());
                }
                other => debug!(?other, "menu event"),
            },
        }
    }

    // -- Graceful shutdown --
    info!("stopping services...");
    scanner.stop().await;
    menu.shutdown().await;
    tray.shutdown();
    let _ = backend.await;

    Ok(())
}

fn about_text() -> String {
    format!("BuckyOS tray controller {}", env!("CARGO_PKG_VERSION"))
}

/// Stand-in for a GUI backend: logs updates and dismisses every menu.
async fn headless_backend(mut updates: mpsc::UnboundedReceiver<TrayUpdate>) {
    while let Some(update) = updates.recv().await {
        match update {
            TrayUpdate::StatusChanged {
                status, tooltip, ..
            } => info!(%status, %tooltip, "tray status"),
            TrayUpdate::ShowMenu {
                request_tag,
                items,
                reply,
            } => {
                debug!(request_tag, items = items.len(), "menu requested without a tray backend");
                let _ = reply.send(None);
            }
            TrayUpdate::Notice { title, body } => info!(%title, %body, "notice"),
            TrayUpdate::Shutdown => break,
        }
    }
}
