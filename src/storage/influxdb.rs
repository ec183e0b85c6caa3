//! InfluxDB implementation of the time-series store
//!
//! Writes go directly to the bucket with millisecond precision so that a
//! storage fault surfaces on the ingestion call that caused it. Reads issue a
//! Flux `last()` query over a bounded window.

use super::TimeSeriesStore;
use crate::config::InfluxConfig;
use crate::error::{MonitorError, Result};
use crate::validation::ReadingPoint;
use async_trait::async_trait;
use chrono::Utc;
use futures::stream;
use influxdb2::api::write::TimestampPrecision;
use influxdb2::models::{DataPoint, Query};
use influxdb2::Client;
use influxdb2_derive::FromDataPoint;
use std::time::Duration;
use tracing::debug;

/// One row of a Flux `last()` query result
#[derive(Debug, Default, FromDataPoint)]
struct LastValueRow {
    value: f64,
}

/// InfluxDB-backed store for inverter readings
pub struct InfluxStore {
    client: Client,
    config: InfluxConfig,
}

impl InfluxStore {
    /// Create a store from configuration
    pub fn new(config: InfluxConfig) -> Self {
        let client = Client::new(&config.url, &config.org, &config.token);
        Self { client, config }
    }
}

#[async_trait]
impl TimeSeriesStore for InfluxStore {
    async fn write_reading(&self, point: ReadingPoint) -> Result<()> {
        let mut builder = DataPoint::builder(&self.config.measurement)
            .tag("device_name", &self.config.device_name);

        for (name, value) in &point.tags {
            builder = builder.tag(name, value);
        }
        for (name, value) in &point.fields {
            builder = builder.field(name, *value);
        }

        let data_point = builder
            .timestamp(Utc::now().timestamp_millis())
            .build()
            .map_err(|e| MonitorError::storage(format!("Failed to build data point: {e}")))?;

        debug!(
            measurement = %self.config.measurement,
            fields = point.fields.len(),
            tags = point.tags.len(),
            "writing reading to InfluxDB"
        );

        self.client
            .write_with_precision(
                &self.config.bucket,
                stream::once(async { data_point }),
                TimestampPrecision::Milliseconds,
            )
            .await
            .map_err(|e| MonitorError::storage(format!("InfluxDB write failed: {e}")))
    }

    async fn last_value(&self, field: &str, window: Duration) -> Result<Option<f64>> {
        let flux = format!(
            r#"
            from(bucket: "{}")
                |> range(start: -{}s)
                |> filter(fn: (r) => r._measurement == "{}" and r._field == "{}")
                |> last()
            "#,
            self.config.bucket,
            window.as_secs(),
            self.config.measurement,
            field
        );

        let rows: Vec<LastValueRow> = self
            .client
            .query(Some(Query::new(flux)))
            .await
            .map_err(|e| MonitorError::storage(format!("InfluxDB query failed: {e}")))?;

        Ok(rows.into_iter().next_back().map(|row| row.value))
    }
}
