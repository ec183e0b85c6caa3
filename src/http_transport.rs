//! HTTP transport for the inverter monitoring service
//!
//! Routes:
//! - `POST /api/inverter_data`: telemetry ingestion
//! - `GET /api/power`: latest instantaneous power
//! - `GET /api/energy/today`: latest cumulated energy for today
//! - `GET /health`: liveness and uptime

use crate::error::{MonitorError, Result};
use crate::ingest::{IngestOutcome, IngestService};
use crate::storage::TimeSeriesStore;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Read endpoints look this far back for the most recent value
const RECENT_WINDOW: Duration = Duration::from_secs(3600);

const POWER_FIELD: &str = "power_in_total";
const ENERGY_TODAY_FIELD: &str = "cumulated_energy_today";

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Shared state for HTTP handlers
pub struct AppState {
    /// Ingestion orchestrator
    pub ingest: IngestService,
    /// Read-side query collaborator
    pub store: Arc<dyn TimeSeriesStore>,
    /// Process start time, reported by the health endpoint
    pub started_at: DateTime<Utc>,
}

/// HTTP transport server
pub struct HttpTransportServer {
    state: Arc<AppState>,
    config: HttpServerConfig,
}

impl HttpTransportServer {
    /// Create the server with shared application state
    pub fn new(state: Arc<AppState>, config: HttpServerConfig) -> Self {
        Self { state, config }
    }

    /// Build the router; exposed separately so tests can drive it in-process
    pub fn router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/api/inverter_data", post(receive_reading))
            .route("/api/power", get(get_power))
            .route("/api/energy/today", get(get_today_energy))
            .route("/health", get(health_check))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Bind and serve until the process is stopped
    pub async fn start(self) -> Result<()> {
        let app = Self::router(self.state);
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        info!("HTTP server listening on {addr}");
        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// `POST /api/inverter_data`
async fn receive_reading(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Response {
    let Ok(Json(payload)) = payload else {
        return malformed_payload_response();
    };

    match state.ingest.ingest(&payload, Utc::now()).await {
        Ok(IngestOutcome::Stored) => (
            StatusCode::CREATED,
            Json(json!({"status": "success", "message": "Data stored"})),
        )
            .into_response(),
        Ok(IngestOutcome::NoStorableFields) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Data received but contained no storeable fields"
            })),
        )
            .into_response(),
        Err(MonitorError::InvalidInput(_)) => malformed_payload_response(),
        Err(e) => {
            error!(error = %e, "ingestion failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": "An internal error occurred while processing the data"
                })),
            )
                .into_response()
        }
    }
}

fn malformed_payload_response() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"status": "error", "message": "Invalid or empty JSON payload"})),
    )
        .into_response()
}

/// `GET /api/power`
async fn get_power(State(state): State<Arc<AppState>>) -> Response {
    latest_field_response(&state, POWER_FIELD).await
}

/// `GET /api/energy/today`
async fn get_today_energy(State(state): State<Arc<AppState>>) -> Response {
    latest_field_response(&state, ENERGY_TODAY_FIELD).await
}

async fn latest_field_response(state: &AppState, field: &str) -> Response {
    match state.store.last_value(field, RECENT_WINDOW).await {
        Ok(Some(value)) => {
            let mut body = serde_json::Map::new();
            body.insert("status".to_string(), json!("success"));
            body.insert(field.to_string(), json!(value));
            (StatusCode::OK, Json(Value::Object(body))).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": "error", "message": "No data found"})),
        )
            .into_response(),
        Err(e) => {
            error!(field, error = %e, "query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "message": "Error fetching data"})),
            )
                .into_response()
        }
    }
}

/// `GET /health`
async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let uptime = Utc::now().signed_duration_since(state.started_at);
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_seconds": uptime.num_seconds(),
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}
