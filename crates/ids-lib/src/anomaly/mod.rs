//! Anomaly detection and stability scoring for network metrics
//!
//! This module provides:
//! - Gas price spikes (current sample far above the previous one)
//! - A 0-100 stability score derived from the latest sample

mod spike_detector;
mod stability;

pub use spike_detector::{GasSpike, GasSpikeDetector, DEFAULT_SPIKE_MULTIPLIER, GAS_PRICE_FLOOR};
pub use stability::{stability_score, DEFAULT_STABILITY_SCORE};
