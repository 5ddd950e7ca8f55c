//! BuckyOS tray controller entry point.

mod actions;
mod app;
mod config;

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = config::Config::load()?;

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        root = %config.root_dir.display(),
        "starting BuckyOS tray controller"
    );

    // Both components are single-threaded event loops.
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(app::run(config))?;

    tracing::info!("tray controller shut down cleanly");
    Ok(())
}
