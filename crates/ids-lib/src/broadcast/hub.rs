//! Broadcast hub: owns the subscriber registry and fans events out to it

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;
use tracing::debug;

use super::registry::{SubscriberId, SubscriberRegistry};
use crate::error::DeliveryFault;
use crate::models::StreamEvent;
use crate::observability::{PipelineMetrics, StructuredLogger};

/// Default number of undelivered events a subscriber may hold
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Outcome of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    /// Subscribers that accepted every event
    pub delivered: usize,
    /// Subscribers removed because their queue was full or closed
    pub dropped: usize,
}

/// Receiving side of one subscriber's queue.
///
/// The queue ends (`recv` yields `None`) once the hub drops the subscriber
/// and everything already queued has been drained.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<StreamEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next event
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    /// Take the next queued event without waiting
    pub fn try_recv(&mut self) -> Option<StreamEvent> {
        self.receiver.try_recv().ok()
    }
}

/// Delivers metric and alert events to every active subscriber
pub struct BroadcastHub {
    registry: RwLock<SubscriberRegistry>,
    next_id: AtomicU64,
    queue_capacity: usize,
    metrics: PipelineMetrics,
    logger: StructuredLogger,
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl BroadcastHub {
    /// Create a hub whose subscribers each buffer up to `queue_capacity` events
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            registry: RwLock::new(SubscriberRegistry::default()),
            next_id: AtomicU64::new(1),
            queue_capacity: queue_capacity.max(1),
            metrics: PipelineMetrics::new(),
            logger: StructuredLogger::default(),
        }
    }

    /// Set the logger used for subscriber lifecycle events
    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Register a new subscriber. It receives every event published from now on.
    ///
    /// After [`shutdown_all`](Self::shutdown_all) the returned queue ends
    /// immediately.
    pub async fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(self.queue_capacity);

        let active = {
            let mut registry = self.registry.write().await;
            if !registry.insert(id, sender) {
                // Shut down: the queue is already closed
                debug!(subscriber_id = id, "Subscription refused after shutdown");
                return Subscription { id, receiver };
            }
            registry.len()
        };

        self.metrics.set_subscribers_connected(active);
        self.logger.log_subscriber_connected(id, active);

        Subscription { id, receiver }
    }

    /// Remove a subscriber after its connection closed.
    ///
    /// Returns false if the hub had already dropped it.
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        let (removed, active) = {
            let mut registry = self.registry.write().await;
            let removed = registry.remove(id);
            (removed, registry.len())
        };

        if removed {
            self.metrics.set_subscribers_connected(active);
            self.logger.log_subscriber_disconnected(id, active);
        }
        removed
    }

    /// Remove a subscriber whose delivery failed outside of `publish`
    /// (socket error, send timeout). Counted and logged like a fan-out drop.
    ///
    /// Returns false if the hub had already dropped it.
    pub async fn drop_subscriber(&self, id: SubscriberId, fault: &DeliveryFault) -> bool {
        let (removed, active) = {
            let mut registry = self.registry.write().await;
            let removed = registry.remove(id);
            (removed, registry.len())
        };

        if removed {
            self.metrics.inc_subscribers_dropped();
            self.metrics.set_subscribers_connected(active);
            self.logger.log_subscriber_dropped(id, fault);
        }
        removed
    }

    /// Number of active subscribers
    pub async fn subscriber_count(&self) -> usize {
        self.registry.read().await.len()
    }

    /// Enqueue `events`, in order, for every active subscriber.
    ///
    /// Never waits on a subscriber. A subscriber whose queue cannot take the
    /// whole batch is removed and its queue closed.
    pub async fn publish(&self, events: &[StreamEvent]) -> FanoutReport {
        let mut report = FanoutReport::default();
        if events.is_empty() {
            return report;
        }

        let mut failed = Vec::new();
        {
            let registry = self.registry.read().await;
            for (id, sender) in registry.iter() {
                match enqueue(sender, events) {
                    Ok(()) => report.delivered += 1,
                    Err(fault) => failed.push((id, fault)),
                }
            }
        }

        if failed.is_empty() {
            return report;
        }

        let active = {
            let mut registry = self.registry.write().await;
            for (id, fault) in &failed {
                if registry.remove(*id) {
                    report.dropped += 1;
                    self.metrics.inc_subscribers_dropped();
                    self.logger.log_subscriber_dropped(*id, fault);
                }
            }
            registry.len()
        };
        self.metrics.set_subscribers_connected(active);

        report
    }

    /// Close every subscriber queue and refuse new subscribers. Used on
    /// process shutdown.
    pub async fn shutdown_all(&self) -> usize {
        let count = self.registry.write().await.close();
        self.metrics.set_subscribers_connected(0);
        count
    }
}

fn enqueue(sender: &mpsc::Sender<StreamEvent>, events: &[StreamEvent]) -> Result<(), DeliveryFault> {
    for event in events {
        sender.try_send(event.clone()).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryFault::QueueFull,
            TrySendError::Closed(_) => DeliveryFault::QueueClosed,
        })?;
    }
    Ok(())
}
