//! Gas price spike detection
//!
//! Compares each sample against the sample ingested immediately before it,
//! whatever network either one came from.

use crate::error::DetectionFault;
use crate::models::MetricSample;

/// Default ratio over the previous gas price that counts as a spike
pub const DEFAULT_SPIKE_MULTIPLIER: f64 = 3.0;

/// Lower bound applied to the previous gas price so a zero baseline still
/// yields a positive threshold
pub const GAS_PRICE_FLOOR: f64 = 1e-9;

/// Detects gas price spikes between consecutive samples
#[derive(Debug, Clone)]
pub struct GasSpikeDetector {
    /// Current gas price must exceed `multiplier * previous` to fire
    pub multiplier: f64,
}

impl GasSpikeDetector {
    /// Create a new spike detector with given multiplier
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }

    /// Detect a spike from the two most recent samples
    ///
    /// # Arguments
    /// * `previous` - Sample ingested immediately before `current`, if any
    /// * `current` - Sample that was just appended
    ///
    /// # Returns
    /// * `Ok(Some(GasSpike))` if the current gas price exceeds the threshold
    /// * `Ok(None)` if there is no previous sample or no spike
    /// * `Err(DetectionFault)` if the rule cannot be evaluated
    pub fn detect(
        &self,
        previous: Option<&MetricSample>,
        current: &MetricSample,
    ) -> Result<Option<GasSpike>, DetectionFault> {
        let Some(previous) = previous else {
            return Ok(None);
        };

        let baseline = previous.gas_price.max(GAS_PRICE_FLOOR);
        let threshold = self.multiplier * baseline;

        if !threshold.is_finite() {
            return Err(DetectionFault::NonFiniteThreshold {
                previous: previous.gas_price,
                multiplier: self.multiplier,
            });
        }

        if current.gas_price > threshold {
            Ok(Some(GasSpike {
                previous_gas_price: previous.gas_price,
                current_gas_price: current.gas_price,
                threshold,
                ratio: current.gas_price / baseline,
            }))
        } else {
            Ok(None)
        }
    }
}

impl Default for GasSpikeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SPIKE_MULTIPLIER)
    }
}

/// Gas spike finding details
#[derive(Debug, Clone, PartialEq)]
pub struct GasSpike {
    /// Gas price of the preceding sample
    pub previous_gas_price: f64,
    /// Gas price that triggered the spike
    pub current_gas_price: f64,
    /// Threshold that was exceeded
    pub threshold: f64,
    /// Current over (floored) previous gas price
    pub ratio: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(network: &str, gas_price: f64) -> MetricSample {
        MetricSample {
            ingested_at: 0,
            network: network.to_string(),
            gas_price,
            block_time: 5.0,
            tx_volume: 100,
            pending_tx: 10,
            failed_tx_rate: 0.1,
        }
    }

    #[test]
    fn test_no_previous_sample() {
        let detector = GasSpikeDetector::default();

        let result = detector.detect(None, &sample("eth", 1_000.0)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_detect_spike() {
        let detector = GasSpikeDetector::default();

        let spike = detector
            .detect(Some(&sample("eth", 50.0)), &sample("eth", 200.0))
            .unwrap()
            .unwrap();

        assert_eq!(spike.threshold, 150.0);
        assert_eq!(spike.current_gas_price, 200.0);
        assert!((spike.ratio - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_exactly_threshold_does_not_fire() {
        let detector = GasSpikeDetector::default();

        let result = detector
            .detect(Some(&sample("eth", 50.0)), &sample("eth", 150.0))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_zero_baseline_uses_floor() {
        let detector = GasSpikeDetector::default();

        let result = detector
            .detect(Some(&sample("eth", 0.0)), &sample("eth", 0.01))
            .unwrap();
        assert!(result.is_some());

        let flat = detector
            .detect(Some(&sample("eth", 0.0)), &sample("eth", 0.0))
            .unwrap();
        assert!(flat.is_none());
    }

    #[test]
    fn test_networks_are_not_separated() {
        let detector = GasSpikeDetector::default();

        let result = detector
            .detect(Some(&sample("polygon", 10.0)), &sample("eth", 100.0))
            .unwrap();
        assert!(result.is_some());
    }

    #[test]
    fn test_non_finite_threshold_is_a_fault() {
        let detector = GasSpikeDetector::new(f64::MAX);

        let result = detector.detect(Some(&sample("eth", 10.0)), &sample("eth", 20.0));
        assert!(matches!(
            result,
            Err(DetectionFault::NonFiniteThreshold { .. })
        ));
    }
}
