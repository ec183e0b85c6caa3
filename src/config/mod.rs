//! Configuration management for the inverter monitoring service
//!
//! All configuration is environment-provided: InfluxDB and Gotify endpoints,
//! per-field validation ranges, and the stuck-signal detector policy.

use crate::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, env, time::Duration};
use url::Url;

/// Inclusive validation bound for one telemetry field
pub type ValidationRange = (f64, f64);

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// InfluxDB storage configuration
    pub influxdb: InfluxConfig,

    /// Gotify notification configuration
    pub gotify: GotifyConfig,

    /// Stuck-signal detector configuration
    pub detector: DetectorConfig,

    /// Per-field validation ranges
    pub validation: ValidationConfig,
}

/// InfluxDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluxConfig {
    /// InfluxDB URL (e.g., http://localhost:8086)
    pub url: String,

    /// Organization name
    pub org: String,

    /// API token for authentication
    pub token: String,

    /// Bucket holding inverter readings
    pub bucket: String,

    /// Measurement name for inverter readings
    pub measurement: String,

    /// Fixed identifying tag attached to every point
    pub device_name: String,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8086".to_string(),
            org: String::new(),
            token: String::new(),
            bucket: "inverter".to_string(),
            measurement: "inverter_readings".to_string(),
            device_name: "main_inverter".to_string(),
        }
    }
}

/// Gotify notification configuration
///
/// URL and token are optional: when either is missing, alert dispatch
/// degrades to a log line instead of an outbound request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GotifyConfig {
    /// Gotify server URL (e.g., https://gotify.example.com)
    pub url: Option<String>,

    /// Application token
    pub token: Option<String>,

    /// Message priority
    pub priority: u8,

    /// Request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for GotifyConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            priority: 5,
            timeout: Duration::from_secs(5),
        }
    }
}

impl GotifyConfig {
    /// Whether enough configuration is present to send notifications
    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.token.is_some()
    }
}

/// Stuck-signal detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Name of the monitored field
    pub signal: String,

    /// Consecutive identical readings required before alerting
    pub threshold: u32,

    /// Minimum interval between alerts
    #[serde(with = "humantime_serde")]
    pub cooldown: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            signal: "power_in_total".to_string(),
            threshold: 5,
            cooldown: Duration::from_secs(300),
        }
    }
}

/// Per-field validation range configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Inclusive (min, max) bounds keyed by field name
    pub ranges: HashMap<String, ValidationRange>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        let mut ranges = HashMap::new();
        ranges.insert("grid_voltage".to_string(), (180.0, 280.0));
        ranges.insert("power_in_total".to_string(), (0.0, 10000.0));
        ranges.insert("inverter_temp".to_string(), (-20.0, 120.0));
        Self { ranges }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var("INFLUXDB_URL") {
            config.influxdb.url = url;
        }
        if let Ok(org) = env::var("INFLUXDB_ORG") {
            config.influxdb.org = org;
        }
        if let Ok(token) = env::var("INFLUXDB_TOKEN") {
            config.influxdb.token = token;
        }
        if let Ok(bucket) = env::var("INFLUXDB_BUCKET") {
            config.influxdb.bucket = bucket;
        }
        if let Ok(device) = env::var("DEVICE_NAME") {
            config.influxdb.device_name = device;
        }

        config.gotify.url = env::var("GOTIFY_URL").ok().filter(|v| !v.is_empty());
        config.gotify.token = env::var("GOTIFY_TOKEN").ok().filter(|v| !v.is_empty());

        if let Ok(threshold) = env::var("STUCK_SIGNAL_THRESHOLD") {
            config.detector.threshold = threshold
                .parse()
                .map_err(|_| MonitorError::config("STUCK_SIGNAL_THRESHOLD must be an integer"))?;
        }
        if let Ok(cooldown) = env::var("STUCK_ALERT_COOLDOWN_SECS") {
            let secs: u64 = cooldown
                .parse()
                .map_err(|_| MonitorError::config("STUCK_ALERT_COOLDOWN_SECS must be an integer"))?;
            config.detector.cooldown = Duration::from_secs(secs);
        }

        if let Ok(ranges) = env::var("VALIDATION_RANGES") {
            config.validation.ranges = serde_json::from_str(&ranges).map_err(|e| {
                MonitorError::config(format!(
                    "VALIDATION_RANGES must be a JSON map of field to [min, max]: {e}"
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.influxdb.url)
            .map_err(|e| MonitorError::config(format!("Invalid InfluxDB URL: {e}")))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(MonitorError::config(
                "InfluxDB URL must use http or https scheme",
            ));
        }
        if self.influxdb.bucket.is_empty() {
            return Err(MonitorError::config("InfluxDB bucket cannot be empty"));
        }
        if self.influxdb.measurement.is_empty() {
            return Err(MonitorError::config("Measurement name cannot be empty"));
        }

        if let Some(gotify_url) = &self.gotify.url {
            Url::parse(gotify_url)
                .map_err(|e| MonitorError::config(format!("Invalid Gotify URL: {e}")))?;
        }

        if self.detector.threshold == 0 {
            return Err(MonitorError::config("Detector threshold must be at least 1"));
        }
        if self.detector.signal.is_empty() {
            return Err(MonitorError::config("Detector signal cannot be empty"));
        }

        for (field, (min, max)) in &self.validation.ranges {
            if min > max {
                return Err(MonitorError::config(format!(
                    "Validation range for '{field}' has min > max"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detector.threshold, 5);
        assert_eq!(config.detector.cooldown, Duration::from_secs(300));
        assert_eq!(config.detector.signal, "power_in_total");
        assert_eq!(config.influxdb.measurement, "inverter_readings");
        assert_eq!(config.influxdb.device_name, "main_inverter");
    }

    #[test]
    fn test_default_validation_ranges() {
        let config = ValidationConfig::default();
        assert_eq!(config.ranges.get("grid_voltage"), Some(&(180.0, 280.0)));
        assert_eq!(config.ranges.get("power_in_total"), Some(&(0.0, 10000.0)));
        assert_eq!(config.ranges.get("inverter_temp"), Some(&(-20.0, 120.0)));
    }

    #[test]
    fn test_invalid_url_scheme_rejected() {
        let mut config = ServerConfig::default();
        config.influxdb.url = "ftp://influx.local".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let mut config = ServerConfig::default();
        config.detector.threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut config = ServerConfig::default();
        config
            .validation
            .ranges
            .insert("grid_voltage".to_string(), (280.0, 180.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_gotify_unconfigured_by_default() {
        let config = GotifyConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.priority, 5);
    }
}
