//! Realtime fan-out of metric and alert events
//!
//! Each subscriber owns a bounded queue drained by its own delivery task.
//! Publishing never waits on a subscriber: a full or closed queue drops that
//! subscriber from the registry and leaves everyone else untouched.

mod hub;
mod registry;

pub use hub::{BroadcastHub, FanoutReport, Subscription, DEFAULT_QUEUE_CAPACITY};
pub use registry::SubscriberId;
