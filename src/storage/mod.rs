//! Time-series storage for inverter readings

pub mod influxdb;

pub use influxdb::InfluxStore;

use crate::error::Result;
use crate::validation::ReadingPoint;
use async_trait::async_trait;
use std::time::Duration;

/// Storage collaborator seam.
///
/// A write either fully persists one point or fails with no partial side
/// effects observable by the caller. Reads return the most recent value of a
/// field within a bounded recent window.
#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    /// Persist one reading
    async fn write_reading(&self, point: ReadingPoint) -> Result<()>;

    /// Most recent value of `field` within the last `window`, if any
    async fn last_value(&self, field: &str, window: Duration) -> Result<Option<f64>>;
}
