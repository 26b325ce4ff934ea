//! HTTP client for the daemon API.
//!
//! Used by `vigil-cli` and useful for integration tooling.

pub mod types;

use anyhow::Result;

use types::StatsSnapshot;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:7871";

pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

impl Client {
    /// Client against the default local daemon address.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Fetch the cumulative availability snapshot.
    pub async fn get_stats(&self) -> Result<StatsSnapshot> {
        let response = self
            .http
            .get(format!("{}/v0/stats", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Submit one reading; returns the stamped record.
    pub async fn submit_reading(&self, payload: &serde_json::Value) -> Result<serde_json::Value> {
        let response = self
            .http
            .post(format!("{}/v0/readings", self.base_url))
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}
