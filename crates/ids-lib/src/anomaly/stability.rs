//! Stability score of the most recent sample

use crate::models::MetricSample;

/// Score reported before any sample has been ingested
pub const DEFAULT_STABILITY_SCORE: u8 = 100;

/// Score the latest sample on a 0-100 scale.
///
/// Only the last sample counts: `(1 - failed_tx_rate) * 100 - pending_tx / 1000`,
/// rounded and clamped.
pub fn stability_score(last: Option<&MetricSample>) -> u8 {
    let Some(last) = last else {
        return DEFAULT_STABILITY_SCORE;
    };

    let raw = (1.0 - last.failed_tx_rate) * 100.0 - last.pending_tx as f64 / 1000.0;
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}
