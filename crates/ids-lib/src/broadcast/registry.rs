//! Set of currently active subscribers

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::models::StreamEvent;

/// Process-unique subscriber handle
pub type SubscriberId = u64;

/// Active subscribers keyed by id. Membership is the only state kept.
#[derive(Debug, Default)]
pub(super) struct SubscriberRegistry {
    subscribers: HashMap<SubscriberId, mpsc::Sender<StreamEvent>>,
    closed: bool,
}

impl SubscriberRegistry {
    /// Returns false (and drops `sender`) once the registry is closed
    pub(super) fn insert(&mut self, id: SubscriberId, sender: mpsc::Sender<StreamEvent>) -> bool {
        if self.closed {
            return false;
        }
        self.subscribers.insert(id, sender);
        true
    }

    /// Returns true if the subscriber was still registered
    pub(super) fn remove(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    pub(super) fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub(super) fn iter(&self) -> impl Iterator<Item = (SubscriberId, &mpsc::Sender<StreamEvent>)> {
        self.subscribers.iter().map(|(id, sender)| (*id, sender))
    }

    /// Drop every sender, closing all queues. Later inserts are refused.
    pub(super) fn close(&mut self) -> usize {
        self.closed = true;
        let count = self.subscribers.len();
        self.subscribers.clear();
        count
    }
}
