//! Core library for the ChainCast intrusion detection service
//!
//! This crate provides the core functionality for:
//! - Validating and ingesting network metric reports
//! - Gas price spike detection and alert recording
//! - Stability scoring of the latest sample
//! - Realtime fan-out of metric and alert events to subscribers
//! - Prometheus metrics and structured logging

pub mod anomaly;
pub mod broadcast;
pub mod error;
pub mod models;
pub mod observability;
pub mod pipeline;

pub use anomaly::{stability_score, GasSpike, GasSpikeDetector, DEFAULT_STABILITY_SCORE};
pub use broadcast::{BroadcastHub, FanoutReport, SubscriberId, Subscription};
pub use error::{DeliveryFault, DetectionFault, ValidationError};
pub use models::*;
pub use observability::{PipelineMetrics, StructuredLogger};
pub use pipeline::{IngestReceipt, Pipeline};
