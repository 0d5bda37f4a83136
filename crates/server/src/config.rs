//! Server configuration

use anyhow::{ensure, Result};
use serde::Deserialize;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to listen on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Port for HTTP and WebSocket traffic
    #[serde(default = "default_port")]
    pub port: u16,

    /// Undelivered events a subscriber may hold before it is dropped
    #[serde(default = "default_subscriber_queue_capacity")]
    pub subscriber_queue_capacity: usize,

    /// Interval between keepalive pings on realtime connections, in seconds
    #[serde(default = "default_keepalive_interval")]
    pub keepalive_interval_secs: u64,

    /// Gas price ratio over the previous sample that raises an alert
    #[serde(default = "default_spike_multiplier")]
    pub spike_multiplier: f64,
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_subscriber_queue_capacity() -> usize {
    ids_lib::broadcast::DEFAULT_QUEUE_CAPACITY
}

fn default_keepalive_interval() -> u64 {
    30
}

fn default_spike_multiplier() -> f64 {
    ids_lib::anomaly::DEFAULT_SPIKE_MULTIPLIER
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            subscriber_queue_capacity: default_subscriber_queue_capacity(),
            keepalive_interval_secs: default_keepalive_interval(),
            spike_multiplier: default_spike_multiplier(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `CHAINCAST_*` environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("CHAINCAST").try_parsing(true))
            .build()?;

        Self::from_config(config)
    }

    /// Deserialize and check an already-built configuration
    pub fn from_config(config: config::Config) -> Result<Self> {
        let server: ServerConfig = config.try_deserialize()?;
        server.validate()?;
        Ok(server)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.subscriber_queue_capacity > 0,
            "subscriber_queue_capacity must be at least 1"
        );
        ensure!(
            self.keepalive_interval_secs > 0,
            "keepalive_interval_secs must be at least 1"
        );
        ensure!(
            self.spike_multiplier.is_finite() && self.spike_multiplier > 0.0,
            "spike_multiplier must be a positive number, got {}",
            self.spike_multiplier
        );
        Ok(())
    }

    /// Socket address to bind
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_config(config::Config::builder().build().unwrap()).unwrap();

        assert_eq!(config.listen_addr(), "127.0.0.1:8000");
        assert_eq!(config.subscriber_queue_capacity, 256);
        assert_eq!(config.keepalive_interval_secs, 30);
        assert_eq!(config.spike_multiplier, 3.0);
    }

    #[test]
    fn test_overrides() {
        let built = config::Config::builder()
            .set_override("port", 9100)
            .unwrap()
            .set_override("spike_multiplier", 5.0)
            .unwrap()
            .build()
            .unwrap();

        let config = ServerConfig::from_config(built).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.spike_multiplier, 5.0);
    }

    #[test]
    fn test_rejects_zero_queue_capacity() {
        let built = config::Config::builder()
            .set_override("subscriber_queue_capacity", 0)
            .unwrap()
            .build()
            .unwrap();

        assert!(ServerConfig::from_config(built).is_err());
    }

    #[test]
    fn test_rejects_non_positive_multiplier() {
        let built = config::Config::builder()
            .set_override("spike_multiplier", -1.0)
            .unwrap()
            .build()
            .unwrap();

        assert!(ServerConfig::from_config(built).is_err());
    }
}
