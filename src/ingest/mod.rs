//! Ingestion orchestration
//!
//! One raw reading flows through two independent passes: the stuck-signal
//! detector (side-effect alerting) and the validator (persistence). The
//! detector sees the raw monitored value even when validation later drops it
//! as out-of-range; a sensor stuck at a bad constant should still alert.

use crate::config::ValidationConfig;
use crate::detector::{AlertEvent, StuckSignalDetector};
use crate::error::{MonitorError, Result};
use crate::notify::Notifier;
use crate::storage::TimeSeriesStore;
use crate::validation::{build_point, classify};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of one successful ingestion call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A point was written to storage
    Stored,
    /// The reading was accepted but contained no storable fields
    NoStorableFields,
}

/// Orchestrates detection, validation, and persistence for one reading
pub struct IngestService {
    detector: Arc<StuckSignalDetector>,
    store: Arc<dyn TimeSeriesStore>,
    notifier: Arc<dyn Notifier>,
    validation: ValidationConfig,
    alert_priority: u8,
}

impl IngestService {
    /// Wire the orchestrator to its collaborators
    pub fn new(
        detector: Arc<StuckSignalDetector>,
        store: Arc<dyn TimeSeriesStore>,
        notifier: Arc<dyn Notifier>,
        validation: ValidationConfig,
        alert_priority: u8,
    ) -> Self {
        Self {
            detector,
            store,
            notifier,
            validation,
            alert_priority,
        }
    }

    /// Process one raw reading.
    ///
    /// Order matters: a malformed payload is rejected before the detector or
    /// validator run, so a fatal client error has no side effects. Alert
    /// dispatch failure is logged and never fails the ingestion.
    pub async fn ingest(&self, payload: &Value, now: DateTime<Utc>) -> Result<IngestOutcome> {
        let fields = payload
            .as_object()
            .filter(|map| !map.is_empty())
            .ok_or_else(|| MonitorError::invalid_input("Invalid or empty JSON payload"))?;

        let monitored = fields.get(self.detector.signal()).and_then(Value::as_f64);
        if let Some(alert) = self.detector.observe(monitored, now) {
            self.dispatch_alert(alert).await;
        }

        let classified = classify(fields, &self.validation);
        let Some(point) = build_point(&classified) else {
            warn!("Received data but no valid numerical fields to store");
            return Ok(IngestOutcome::NoStorableFields);
        };

        self.store.write_reading(point).await?;
        info!(signal = %self.detector.signal(), "reading stored");
        Ok(IngestOutcome::Stored)
    }

    async fn dispatch_alert(&self, alert: AlertEvent) {
        let message = format!(
            "Power value has not changed for the last {} readings: {} W",
            self.detector.threshold(),
            alert.value
        );
        if let Err(e) = self
            .notifier
            .notify("Inverter Power Alert", &message, self.alert_priority)
            .await
        {
            warn!(signal = %alert.signal, error = %e, "alert notification failed");
        }
    }
}
