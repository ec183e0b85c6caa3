//! Inverter monitoring service - main entry point

use inverter_monitor_rust::{
    config::ServerConfig,
    detector::StuckSignalDetector,
    http_transport::{AppState, HttpServerConfig, HttpTransportServer},
    ingest::IngestService,
    notify::GotifyNotifier,
    storage::InfluxStore,
    Result,
};

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

/// Command line arguments
#[derive(Parser)]
#[command(name = "inverter-monitor-server")]
#[command(about = "Solar inverter telemetry ingestion and monitoring server")]
#[command(version)]
struct Cli {
    /// Host to bind to
    #[arg(long, env = "INVERTER_HTTP_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to bind to
    #[arg(short, long, env = "INVERTER_HTTP_PORT", default_value = "5000")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = inverter_monitor_rust::logging::LogConfig::from_env();
    if let Err(e) = inverter_monitor_rust::logging::init_logging(log_config) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if !config.gotify.is_configured() {
        info!("Gotify not configured; stuck-signal alerts will only be logged");
    }

    let store = Arc::new(InfluxStore::new(config.influxdb.clone()));
    let notifier = Arc::new(GotifyNotifier::new(config.gotify.clone())?);
    let detector = Arc::new(StuckSignalDetector::new(config.detector.clone()));
    let ingest = IngestService::new(
        detector,
        store.clone(),
        notifier,
        config.validation.clone(),
        config.gotify.priority,
    );

    let state = Arc::new(AppState {
        ingest,
        store,
        started_at: chrono::Utc::now(),
    });

    info!(
        signal = %config.detector.signal,
        threshold = config.detector.threshold,
        "starting inverter monitoring server"
    );

    let http_config = HttpServerConfig {
        host: cli.host,
        port: cli.port,
    };
    HttpTransportServer::new(state, http_config).start().await
}
