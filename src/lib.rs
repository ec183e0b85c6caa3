//! Inverter monitoring service
//!
//! Ingests periodic telemetry readings from a solar inverter, persists them
//! to InfluxDB, exposes read endpoints for the latest power/energy values,
//! and raises a rate-limited Gotify alert when the monitored power signal
//! appears stuck.
//!
//! The core pipeline is field classification (`validation`), stuck-signal
//! detection (`detector`), and the orchestrator joining them (`ingest`).
//! Storage, notification, and HTTP transport are collaborators behind seams.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use inverter_monitor_rust::{
//!     config::ServerConfig,
//!     detector::StuckSignalDetector,
//!     http_transport::{AppState, HttpServerConfig, HttpTransportServer},
//!     ingest::IngestService,
//!     notify::GotifyNotifier,
//!     storage::InfluxStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::from_env()?;
//!     let store = Arc::new(InfluxStore::new(config.influxdb.clone()));
//!     let notifier = Arc::new(GotifyNotifier::new(config.gotify.clone())?);
//!     let detector = Arc::new(StuckSignalDetector::new(config.detector.clone()));
//!     let ingest = IngestService::new(
//!         detector,
//!         store.clone(),
//!         notifier,
//!         config.validation.clone(),
//!         config.gotify.priority,
//!     );
//!     let state = Arc::new(AppState {
//!         ingest,
//!         store,
//!         started_at: chrono::Utc::now(),
//!     });
//!     HttpTransportServer::new(state, HttpServerConfig::default())
//!         .start()
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod detector;
pub mod error;
pub mod http_transport;
pub mod ingest;
pub mod logging;
pub mod notify;
pub mod storage;
pub mod validation;

pub use config::ServerConfig;
pub use error::{MonitorError, Result};
