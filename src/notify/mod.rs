//! Outbound notification transport
//!
//! Alerts are delivered to a Gotify server. Delivery is best-effort: the
//! ingestion path logs failures and never propagates them to the caller.

use crate::config::GotifyConfig;
use crate::error::{MonitorError, Result};
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

/// Notification transport seam
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification
    async fn notify(&self, title: &str, message: &str, priority: u8) -> Result<()>;
}

/// Gotify notification client
pub struct GotifyNotifier {
    config: GotifyConfig,
    client: reqwest::Client,
}

impl GotifyNotifier {
    /// Create a notifier from configuration
    pub fn new(config: GotifyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MonitorError::notification(format!("HTTP client setup failed: {e}")))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Notifier for GotifyNotifier {
    async fn notify(&self, title: &str, message: &str, priority: u8) -> Result<()> {
        let (Some(url), Some(token)) = (&self.config.url, &self.config.token) else {
            debug!("Gotify URL or token not configured, skipping notification");
            return Ok(());
        };

        let response = self
            .client
            .post(format!("{}/message?token={}", url.trim_end_matches('/'), token))
            .json(&json!({
                "title": title,
                "message": message,
                "priority": priority,
            }))
            .send()
            .await?;

        if response.status().is_success() {
            info!(title, "Gotify notification sent");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body, "Gotify notification rejected");
            Err(MonitorError::notification(format!(
                "Gotify returned {status}"
            )))
        }
    }
}
