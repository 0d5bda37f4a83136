//! Ingestion pipeline
//!
//! Validates metric reports, appends them to the metric sequence, runs the
//! gas spike rule, records alerts, and hands the resulting events to the
//! broadcast hub. This is the only writer of either sequence.

mod sequence;

pub use sequence::{AlertSequence, MetricSequence};

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tracing::debug;

use crate::anomaly::{stability_score, GasSpike, GasSpikeDetector};
use crate::broadcast::{BroadcastHub, FanoutReport};
use crate::error::ValidationError;
use crate::models::{Alert, MetricReport, MetricSample, StreamEvent};
use crate::observability::{PipelineMetrics, StructuredLogger};

/// Both sequences, guarded together so that append, detection and alert id
/// assignment happen in one critical section.
#[derive(Debug, Default)]
struct Ledger {
    metrics: MetricSequence,
    alerts: AlertSequence,
}

/// Result of a successful ingestion
#[derive(Debug, Clone)]
pub struct IngestReceipt {
    /// The stored sample
    pub sample: MetricSample,
    /// Alert raised by this sample, if any
    pub alert: Option<Alert>,
    /// How the events were fanned out
    pub fanout: FanoutReport,
}

/// Owns the metric and alert sequences
pub struct Pipeline {
    ledger: RwLock<Ledger>,
    detector: GasSpikeDetector,
    hub: Arc<BroadcastHub>,
    metrics: PipelineMetrics,
    logger: StructuredLogger,
}

impl Pipeline {
    /// Create a pipeline publishing to `hub` with the default 3x spike rule
    pub fn new(hub: Arc<BroadcastHub>) -> Self {
        Self {
            ledger: RwLock::new(Ledger::default()),
            detector: GasSpikeDetector::default(),
            hub,
            metrics: PipelineMetrics::new(),
            logger: StructuredLogger::default(),
        }
    }

    /// Set custom spike detector
    pub fn with_detector(mut self, detector: GasSpikeDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Set the logger used for ingestion events
    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }

    /// Ingest a report stamped with the current time
    pub async fn ingest(&self, report: MetricReport) -> Result<IngestReceipt, ValidationError> {
        self.ingest_at(report, chrono::Utc::now().timestamp()).await
    }

    /// Ingest a report stamped with `ingested_at` (seconds since the epoch)
    ///
    /// Validation happens before the lock is taken; a rejected report leaves
    /// both sequences untouched and publishes nothing.
    pub async fn ingest_at(
        &self,
        report: MetricReport,
        ingested_at: i64,
    ) -> Result<IngestReceipt, ValidationError> {
        let start = Instant::now();

        let sample = match report.into_sample(ingested_at) {
            Ok(sample) => sample,
            Err(e) => {
                self.metrics.inc_validation_failures();
                self.logger.log_validation_rejected(&e);
                return Err(e);
            }
        };

        let mut ledger = self.ledger.write().await;
        let Ledger { metrics, alerts } = &mut *ledger;

        // `previous` is the entry that will sit right before `sample`
        let finding = self.evaluate(metrics.last(), &sample);
        metrics.append(sample.clone());
        self.metrics.inc_samples_ingested();
        self.logger.log_metric_ingested(&sample, metrics.len());

        let alert = finding.map(|spike| {
            let alert = alerts.append_gas_spike(&sample).clone();
            self.metrics.inc_alerts_raised();
            self.logger.log_alert_raised(&alert, &spike);
            alert
        });

        let mut events = Vec::with_capacity(2);
        events.push(StreamEvent::Metric(sample.clone()));
        if let Some(alert) = &alert {
            events.push(StreamEvent::Alert(alert.clone()));
        }

        // Enqueued under the ledger lock so subscribers see sequence order
        let fanout = self.hub.publish(&events).await;
        drop(ledger);

        self.metrics
            .observe_ingest_latency(start.elapsed().as_secs_f64());
        debug!(
            delivered = fanout.delivered,
            dropped = fanout.dropped,
            events = events.len(),
            "Fan-out complete"
        );

        Ok(IngestReceipt {
            sample,
            alert,
            fanout,
        })
    }

    /// Run the spike rule, swallowing detector faults
    fn evaluate(&self, previous: Option<&MetricSample>, current: &MetricSample) -> Option<GasSpike> {
        match self.detector.detect(previous, current) {
            Ok(finding) => finding,
            Err(fault) => {
                self.metrics.inc_detection_faults();
                self.logger.log_detection_fault(&fault, &current.network);
                None
            }
        }
    }

    /// Stability score of the most recent sample
    pub async fn stability_score(&self) -> u8 {
        let ledger = self.ledger.read().await;
        stability_score(ledger.metrics.last())
    }

    /// Snapshot of the alert sequence
    pub async fn alerts(&self) -> Vec<Alert> {
        self.ledger.read().await.alerts.snapshot()
    }

    /// Snapshot of the metric sequence
    pub async fn samples(&self) -> Vec<MetricSample> {
        self.ledger.read().await.metrics.snapshot()
    }

    pub async fn sample_count(&self) -> usize {
        self.ledger.read().await.metrics.len()
    }

    pub async fn alert_count(&self) -> usize {
        self.ledger.read().await.alerts.len()
    }
}
