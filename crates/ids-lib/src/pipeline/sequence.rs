//! Append-only metric and alert sequences

use crate::models::{Alert, AlertKind, AlertSeverity, MetricSample};

/// Ordered record of every ingested sample. Position is identity.
#[derive(Debug, Default)]
pub struct MetricSequence {
    samples: Vec<MetricSample>,
}

impl MetricSequence {
    pub fn append(&mut self, sample: MetricSample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recently appended sample
    pub fn last(&self) -> Option<&MetricSample> {
        self.samples.last()
    }

    /// The last sample and the one appended just before it
    pub fn last_pair(&self) -> Option<(Option<&MetricSample>, &MetricSample)> {
        let (current, rest) = self.samples.split_last()?;
        Some((rest.last(), current))
    }

    pub fn snapshot(&self) -> Vec<MetricSample> {
        self.samples.clone()
    }
}

/// Ordered record of generated alerts
#[derive(Debug, Default)]
pub struct AlertSequence {
    alerts: Vec<Alert>,
}

impl AlertSequence {
    /// Record a gas spike for `sample`. The id is the alert's 1-based position.
    pub fn append_gas_spike(&mut self, sample: &MetricSample) -> &Alert {
        let alert = Alert {
            id: self.alerts.len() as u64 + 1,
            kind: AlertKind::GasSpike,
            severity: AlertSeverity::High,
            triggered_at: sample.ingested_at,
            sample: sample.clone(),
        };
        self.alerts.push(alert);
        &self.alerts[self.alerts.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn snapshot(&self) -> Vec<Alert> {
        self.alerts.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: i64) -> MetricSample {
        MetricSample {
            ingested_at: ts,
            network: "eth".to_string(),
            gas_price: 50.0,
            block_time: 5.0,
            tx_volume: 100,
            pending_tx: 10,
            failed_tx_rate: 0.1,
        }
    }

    #[test]
    fn test_last_pair() {
        let mut metrics = MetricSequence::default();
        assert!(metrics.last_pair().is_none());

        metrics.append(sample(1));
        let (prev, curr) = metrics.last_pair().unwrap();
        assert!(prev.is_none());
        assert_eq!(curr.ingested_at, 1);

        metrics.append(sample(2));
        let (prev, curr) = metrics.last_pair().unwrap();
        assert_eq!(prev.unwrap().ingested_at, 1);
        assert_eq!(curr.ingested_at, 2);
    }

    #[test]
    fn test_alert_ids_follow_position() {
        let mut alerts = AlertSequence::default();

        for ts in 10..15 {
            let alert = alerts.append_gas_spike(&sample(ts));
            assert_eq!(alert.triggered_at, ts);
        }

        let ids: Vec<u64> = alerts.snapshot().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut alerts = AlertSequence::default();
        alerts.append_gas_spike(&sample(1));

        let snapshot = alerts.snapshot();
        alerts.append_gas_spike(&sample(2));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(alerts.len(), 2);
    }
}
