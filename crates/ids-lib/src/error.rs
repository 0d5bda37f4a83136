//! Error taxonomy for the ingestion pipeline

use std::time::Duration;

use thiserror::Error;

/// A metric report was rejected at the ingestion boundary.
///
/// Raised before any state is touched; the report is dropped and nothing is
/// broadcast.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `network` must be a non-empty string")]
    EmptyNetwork,

    #[error("field `{field}` must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("field `{field}` must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField(field) => field,
            ValidationError::EmptyNetwork => "network",
            ValidationError::NonFinite { field, .. } | ValidationError::Negative { field, .. } => {
                field
            }
        }
    }
}

/// The anomaly rule could not be evaluated for a sample.
///
/// Never reaches the producer: the sample stays ingested and no alert fires.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionFault {
    #[error("spike threshold is not finite (previous gas price {previous}, multiplier {multiplier})")]
    NonFiniteThreshold { previous: f64, multiplier: f64 },
}

/// Delivery to a single subscriber failed. Terminal for that subscriber only.
#[derive(Debug, Error)]
pub enum DeliveryFault {
    #[error("subscriber queue is full")]
    QueueFull,

    #[error("subscriber queue is closed")]
    QueueClosed,

    #[error("failed to encode event: {0}")]
    Encode(String),

    #[error("socket error: {0}")]
    Socket(String),

    #[error("socket send did not complete within {0:?}")]
    SendTimeout(Duration),
}
