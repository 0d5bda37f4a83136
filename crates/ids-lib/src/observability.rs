//! Observability infrastructure for the ingestion pipeline
//!
//! Provides:
//! - Prometheus metrics (ingest latency, samples, alerts, subscriber churn)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::anomaly::GasSpike;
use crate::broadcast::SubscriberId;
use crate::error::{DeliveryFault, DetectionFault, ValidationError};
use crate::models::{Alert, MetricSample};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PipelineMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct PipelineMetricsInner {
    ingest_latency_seconds: Histogram,
    samples_ingested: IntCounter,
    alerts_raised: IntCounter,
    validation_failures: IntCounter,
    detection_faults: IntCounter,
    subscribers_connected: IntGauge,
    subscribers_dropped: IntCounter,
}

impl PipelineMetricsInner {
    fn new() -> Self {
        Self {
            ingest_latency_seconds: register_histogram!(
                "chaincast_ingest_latency_seconds",
                "Time spent appending, evaluating and fanning out one metric report",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register ingest_latency_seconds"),

            samples_ingested: register_int_counter!(
                "chaincast_samples_ingested_total",
                "Total number of metric samples appended to the metric sequence"
            )
            .expect("Failed to register samples_ingested"),

            alerts_raised: register_int_counter!(
                "chaincast_alerts_raised_total",
                "Total number of alerts appended to the alert sequence"
            )
            .expect("Failed to register alerts_raised"),

            validation_failures: register_int_counter!(
                "chaincast_validation_failures_total",
                "Total number of metric reports rejected at the ingestion boundary"
            )
            .expect("Failed to register validation_failures"),

            detection_faults: register_int_counter!(
                "chaincast_detection_faults_total",
                "Total number of samples for which the anomaly rule could not be evaluated"
            )
            .expect("Failed to register detection_faults"),

            subscribers_connected: register_int_gauge!(
                "chaincast_subscribers_connected",
                "Number of realtime subscribers currently registered"
            )
            .expect("Failed to register subscribers_connected"),

            subscribers_dropped: register_int_counter!(
                "chaincast_subscribers_dropped_total",
                "Total number of subscribers removed after a delivery fault"
            )
            .expect("Failed to register subscribers_dropped"),
        }
    }
}

/// Pipeline metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct PipelineMetrics {
    _private: (),
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PipelineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PipelineMetricsInner {
        GLOBAL_METRICS.get_or_init(PipelineMetricsInner::new)
    }

    /// Record how long one ingestion took
    pub fn observe_ingest_latency(&self, duration_secs: f64) {
        self.inner().ingest_latency_seconds.observe(duration_secs);
    }

    pub fn inc_samples_ingested(&self) {
        self.inner().samples_ingested.inc();
    }

    pub fn inc_alerts_raised(&self) {
        self.inner().alerts_raised.inc();
    }

    pub fn inc_validation_failures(&self) {
        self.inner().validation_failures.inc();
    }

    pub fn inc_detection_faults(&self) {
        self.inner().detection_faults.inc();
    }

    /// Update the registered subscriber gauge
    pub fn set_subscribers_connected(&self, count: usize) {
        self.inner().subscribers_connected.set(count as i64);
    }

    pub fn inc_subscribers_dropped(&self) {
        self.inner().subscribers_dropped.inc();
    }
}

/// Structured logger for pipeline events
///
/// Provides consistent JSON-formatted logging for ingestion, alerts,
/// and subscriber lifecycle events.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl Default for StructuredLogger {
    fn default() -> Self {
        Self::new("chaincast-ids")
    }
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    /// Log an accepted metric sample
    pub fn log_metric_ingested(&self, sample: &MetricSample, position: usize) {
        debug!(
            event = "metric_ingested",
            instance = %self.instance,
            network = %sample.network,
            gas_price = sample.gas_price,
            pending_tx = sample.pending_tx,
            failed_tx_rate = sample.failed_tx_rate,
            ts = sample.ingested_at,
            position = position,
            "Metric sample ingested"
        );
    }

    /// Log a rejected metric report
    pub fn log_validation_rejected(&self, error: &ValidationError) {
        info!(
            event = "metric_rejected",
            instance = %self.instance,
            field = %error.field(),
            error = %error,
            "Metric report rejected"
        );
    }

    /// Log a gas spike alert
    pub fn log_alert_raised(&self, alert: &Alert, spike: &GasSpike) {
        warn!(
            event = "alert_raised",
            instance = %self.instance,
            alert_id = alert.id,
            alert_type = %alert.kind,
            severity = %alert.severity,
            network = %alert.sample.network,
            previous_gas_price = spike.previous_gas_price,
            current_gas_price = spike.current_gas_price,
            threshold = spike.threshold,
            ratio = spike.ratio,
            "Gas price spike detected"
        );
    }

    /// Log a swallowed detector failure
    pub fn log_detection_fault(&self, fault: &DetectionFault, network: &str) {
        warn!(
            event = "detection_fault",
            instance = %self.instance,
            network = %network,
            error = %fault,
            "Anomaly rule could not be evaluated, no alert raised"
        );
    }

    /// Log a subscriber joining the registry
    pub fn log_subscriber_connected(&self, id: SubscriberId, active: usize) {
        info!(
            event = "subscriber_connected",
            instance = %self.instance,
            subscriber_id = id,
            active = active,
            "Realtime subscriber connected"
        );
    }

    /// Log a subscriber leaving the registry
    pub fn log_subscriber_disconnected(&self, id: SubscriberId, active: usize) {
        info!(
            event = "subscriber_disconnected",
            instance = %self.instance,
            subscriber_id = id,
            active = active,
            "Realtime subscriber disconnected"
        );
    }

    /// Log a subscriber removed after a delivery fault
    pub fn log_subscriber_dropped(&self, id: SubscriberId, fault: &DeliveryFault) {
        warn!(
            event = "subscriber_dropped",
            instance = %self.instance,
            subscriber_id = id,
            error = %fault,
            "Dropping realtime subscriber"
        );
    }

    /// Log server startup
    pub fn log_startup(&self, version: &str, addr: &str) {
        info!(
            event = "server_started",
            instance = %self.instance,
            version = %version,
            addr = %addr,
            "ChainCast IDS started"
        );
    }

    /// Log server shutdown
    pub fn log_shutdown(&self, reason: &str, subscribers_closed: usize) {
        info!(
            event = "server_shutdown",
            instance = %self.instance,
            reason = %reason,
            subscribers_closed = subscribers_closed,
            "ChainCast IDS shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_metrics_creation() {
        // Metrics live in the global Prometheus registry, so this only checks
        // that every handle method can be called.
        let metrics = PipelineMetrics::new();

        metrics.observe_ingest_latency(0.0001);
        metrics.inc_samples_ingested();
        metrics.inc_alerts_raised();
        metrics.inc_validation_failures();
        metrics.inc_detection_faults();
        metrics.set_subscribers_connected(3);
        metrics.inc_subscribers_dropped();

        let families = prometheus::gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "chaincast_samples_ingested_total"));
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("test-instance");
        assert_eq!(logger.instance, "test-instance");
    }
}
