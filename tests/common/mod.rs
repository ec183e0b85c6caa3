//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use inverter_monitor_rust::config::ValidationConfig;
use inverter_monitor_rust::detector::StuckSignalDetector;
use inverter_monitor_rust::error::{MonitorError, Result};
use inverter_monitor_rust::ingest::IngestService;
use inverter_monitor_rust::notify::Notifier;
use inverter_monitor_rust::storage::TimeSeriesStore;
use inverter_monitor_rust::validation::ReadingPoint;
use inverter_monitor_rust::ServerConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Storage double that records every written point
#[derive(Default)]
pub struct RecordingStore {
    pub points: Mutex<Vec<ReadingPoint>>,
    pub last_values: Mutex<HashMap<String, f64>>,
}

impl RecordingStore {
    pub fn written(&self) -> Vec<ReadingPoint> {
        self.points.lock().unwrap().clone()
    }

    pub fn set_last_value(&self, field: &str, value: f64) {
        self.last_values
            .lock()
            .unwrap()
            .insert(field.to_string(), value);
    }
}

#[async_trait]
impl TimeSeriesStore for RecordingStore {
    async fn write_reading(&self, point: ReadingPoint) -> Result<()> {
        self.points.lock().unwrap().push(point);
        Ok(())
    }

    async fn last_value(&self, field: &str, _window: Duration) -> Result<Option<f64>> {
        Ok(self.last_values.lock().unwrap().get(field).copied())
    }
}

/// Storage double that fails every operation
pub struct FailingStore;

#[async_trait]
impl TimeSeriesStore for FailingStore {
    async fn write_reading(&self, _point: ReadingPoint) -> Result<()> {
        Err(MonitorError::storage("simulated write failure"))
    }

    async fn last_value(&self, _field: &str, _window: Duration) -> Result<Option<f64>> {
        Err(MonitorError::storage("simulated query failure"))
    }
}

/// Notifier double that records every delivered notification
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String, u8)>>,
}

impl RecordingNotifier {
    pub fn delivered(&self) -> Vec<(String, String, u8)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, title: &str, message: &str, priority: u8) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string(), priority));
        Ok(())
    }
}

/// Notifier double that fails every delivery
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _title: &str, _message: &str, _priority: u8) -> Result<()> {
        Err(MonitorError::notification("simulated delivery failure"))
    }
}

/// Wire an ingest service around the given doubles with default configuration
pub fn ingest_service(
    store: Arc<dyn TimeSeriesStore>,
    notifier: Arc<dyn Notifier>,
) -> IngestService {
    let config = ServerConfig::default();
    IngestService::new(
        Arc::new(StuckSignalDetector::new(config.detector)),
        store,
        notifier,
        ValidationConfig::default(),
        config.gotify.priority,
    )
}
