//! Ground Steering - Main Entry Point

use anyhow::Context;
use clap::Parser;
use pipeline::{init_logging, Cli, Pipeline, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli).context("invalid startup parameters")?;
    init_logging(settings.verbose);

    info!("=== Ground Steering v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Frame area '{}' ({}x{}), pairing {:?}",
        settings.name, settings.width, settings.height, settings.pairing
    );

    let pipeline = Pipeline::start(&settings).context("failed to start pipeline")?;
    let session = pipeline.session();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, ending session");
            session.end();
        }
    });

    let summary = tokio::task::spawn_blocking(move || pipeline.run())
        .await
        .context("frame orchestrator task failed")??;

    info!("Processed {} frame(s), {} emission(s)", summary.frames, summary.emissions);
    Ok(())
}
