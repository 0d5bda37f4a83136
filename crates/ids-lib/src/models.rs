//! Core data models for the ingestion pipeline

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Metric report as submitted by a producer, before validation.
///
/// Every field is optional so that a missing field is reported by name
/// instead of failing the whole decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricReport {
    pub network: Option<String>,
    pub gas_price: Option<f64>,
    pub block_time: Option<f64>,
    pub tx_volume: Option<u64>,
    pub pending_tx: Option<u64>,
    pub failed_tx_rate: Option<f64>,
}

impl MetricReport {
    /// Validate the report and stamp it with its arrival time.
    ///
    /// Fields are checked in declaration order and the first failure wins.
    pub fn into_sample(self, ingested_at: i64) -> Result<MetricSample, ValidationError> {
        let network = self
            .network
            .ok_or(ValidationError::MissingField("network"))?;
        if network.trim().is_empty() {
            return Err(ValidationError::EmptyNetwork);
        }

        let gas_price = non_negative_finite("gas_price", self.gas_price)?;
        let block_time = non_negative_finite("block_time", self.block_time)?;
        let tx_volume = self
            .tx_volume
            .ok_or(ValidationError::MissingField("tx_volume"))?;
        let pending_tx = self
            .pending_tx
            .ok_or(ValidationError::MissingField("pending_tx"))?;
        let failed_tx_rate = non_negative_finite("failed_tx_rate", self.failed_tx_rate)?;

        Ok(MetricSample {
            ingested_at,
            network,
            gas_price,
            block_time,
            tx_volume,
            pending_tx,
            failed_tx_rate,
        })
    }
}

fn non_negative_finite(field: &'static str, value: Option<f64>) -> Result<f64, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField(field))?;
    if !value.is_finite() {
        return Err(ValidationError::NonFinite { field, value });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(value)
}

/// One ingested snapshot of network health metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Arrival time in seconds since the epoch, assigned at ingestion
    #[serde(rename = "ts")]
    pub ingested_at: i64,
    pub network: String,
    pub gas_price: f64,
    pub block_time: f64,
    pub tx_volume: u64,
    pub pending_tx: u64,
    pub failed_tx_rate: f64,
}

/// Alert category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    #[serde(rename = "Gas Spike")]
    GasSpike,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::GasSpike => write!(f, "Gas Spike"),
        }
    }
}

/// Alert severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSeverity {
    High,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::High => write!(f, "High"),
        }
    }
}

/// A recorded anomaly. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// 1-based position in the alert sequence
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    /// Copied from the triggering sample's arrival time
    #[serde(rename = "ts")]
    pub triggered_at: i64,
    /// Value copy of the triggering sample
    pub sample: MetricSample,
}

/// Event pushed to realtime subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum StreamEvent {
    Metric(MetricSample),
    Alert(Alert),
}

impl StreamEvent {
    /// Wire name of the event type
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Metric(_) => "metric",
            StreamEvent::Alert(_) => "alert",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_report() -> MetricReport {
        MetricReport {
            network: Some("eth".to_string()),
            gas_price: Some(50.0),
            block_time: Some(5.0),
            tx_volume: Some(100),
            pending_tx: Some(10),
            failed_tx_rate: Some(0.1),
        }
    }

    #[test]
    fn test_valid_report_becomes_sample() {
        let sample = valid_report().into_sample(1_700_000_000).unwrap();

        assert_eq!(sample.network, "eth");
        assert_eq!(sample.gas_price, 50.0);
        assert_eq!(sample.tx_volume, 100);
        assert_eq!(sample.ingested_at, 1_700_000_000);
    }

    #[test]
    fn test_missing_gas_price_rejected() {
        let report = MetricReport {
            gas_price: None,
            ..valid_report()
        };

        let err = report.into_sample(0).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("gas_price"));
        assert_eq!(err.field(), "gas_price");
    }

    #[test]
    fn test_first_invalid_field_wins() {
        let report = MetricReport {
            block_time: None,
            failed_tx_rate: Some(f64::NAN),
            ..valid_report()
        };

        assert_eq!(
            report.into_sample(0).unwrap_err(),
            ValidationError::MissingField("block_time")
        );
    }

    #[test]
    fn test_empty_network_rejected() {
        let report = MetricReport {
            network: Some("   ".to_string()),
            ..valid_report()
        };

        assert_eq!(report.into_sample(0).unwrap_err(), ValidationError::EmptyNetwork);
    }

    #[test]
    fn test_non_finite_and_negative_rejected() {
        let infinite = MetricReport {
            gas_price: Some(f64::INFINITY),
            ..valid_report()
        };
        assert!(matches!(
            infinite.into_sample(0),
            Err(ValidationError::NonFinite { field: "gas_price", .. })
        ));

        let negative = MetricReport {
            failed_tx_rate: Some(-0.5),
            ..valid_report()
        };
        assert!(matches!(
            negative.into_sample(0),
            Err(ValidationError::Negative { field: "failed_tx_rate", .. })
        ));
    }

    #[test]
    fn test_report_decodes_with_missing_fields() {
        let report: MetricReport =
            serde_json::from_str(r#"{"network": "eth", "block_time": 5}"#).unwrap();

        assert_eq!(report.network.as_deref(), Some("eth"));
        assert!(report.gas_price.is_none());
        assert_eq!(report.block_time, Some(5.0));
    }

    #[test]
    fn test_alert_wire_format() {
        let sample = valid_report().into_sample(42).unwrap();
        let alert = Alert {
            id: 1,
            kind: AlertKind::GasSpike,
            severity: AlertSeverity::High,
            triggered_at: 42,
            sample,
        };

        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["type"], "Gas Spike");
        assert_eq!(json["severity"], "High");
        assert_eq!(json["ts"], 42);
        assert_eq!(json["sample"]["gas_price"], 50.0);
        assert_eq!(json["sample"]["ts"], 42);
    }

    #[test]
    fn test_stream_event_envelope() {
        let sample = valid_report().into_sample(7).unwrap();
        let event = StreamEvent::Metric(sample);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "metric");
        assert_eq!(json["payload"]["network"], "eth");
        assert_eq!(event.kind(), "metric");
    }
}
