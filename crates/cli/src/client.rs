//! API client for communicating with the ChainCast IDS server

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// API client for the ChainCast IDS server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(3))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).context("Invalid path")
    }

    /// WebSocket URL of the realtime channel
    pub fn ws_url(&self) -> Result<Url> {
        let mut url = self.url("ws")?;
        let scheme = match url.scheme() {
            "https" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|_| anyhow::anyhow!("Cannot derive WebSocket URL from {}", self.base_url))?;
        Ok(url)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path)?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }
}

// API request/response types

/// Metric report sent by the simulator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricReport {
    pub network: String,
    pub gas_price: f64,
    pub block_time: f64,
    pub tx_volume: u64,
    pub pending_tx: u64,
    pub failed_tx_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    pub ts: i64,
    pub network: String,
    pub gas_price: f64,
    pub block_time: f64,
    pub tx_volume: u64,
    pub pending_tx: u64,
    pub failed_tx_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub severity: String,
    pub ts: i64,
    pub sample: MetricSample,
}

/// Frame pushed on the realtime channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum StreamEvent {
    Metric(MetricSample),
    Alert(Alert),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivedResponse {
    pub received: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_url_from_http() {
        let client = ApiClient::new("http://127.0.0.1:8000").unwrap();
        assert_eq!(client.ws_url().unwrap().as_str(), "ws://127.0.0.1:8000/ws");
    }

    #[test]
    fn test_ws_url_from_https() {
        let client = ApiClient::new("https://ids.example.com/").unwrap();
        assert_eq!(client.ws_url().unwrap().as_str(), "wss://ids.example.com/ws");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ApiClient::new("not a url").is_err());
    }

    #[test]
    fn test_stream_event_decodes_alert() {
        let frame = r#"{"type":"alert","payload":{"id":3,"type":"Gas Spike","severity":"High","ts":10,
            "sample":{"ts":10,"network":"eth","gas_price":200.0,"block_time":5.0,"tx_volume":100,
            "pending_tx":10,"failed_tx_rate":0.1}}}"#;

        match serde_json::from_str::<StreamEvent>(frame).unwrap() {
            StreamEvent::Alert(alert) => {
                assert_eq!(alert.id, 3);
                assert_eq!(alert.alert_type, "Gas Spike");
            }
            StreamEvent::Metric(_) => panic!("expected alert"),
        }
    }
}
