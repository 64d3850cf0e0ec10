//! esprelay daemon entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// ESP32 web relay daemon
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via ESPRELAY_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = esprelay_relayd::AppConfig::load(args.config)?;

    esprelay_telemetry::init_logging(&config.telemetry.log_level)?;

    info!("Starting esprelay v{}", env!("CARGO_PKG_VERSION"));
    info!(
        port = config.server.port,
        simulator = config.simulator.enabled,
        "Configuration loaded"
    );

    let app = esprelay_relayd::Application::new(config);
    app.run().await?;

    Ok(())
}
