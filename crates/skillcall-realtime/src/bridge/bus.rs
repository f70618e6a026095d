//! In-process domain event bus for single-node deployments.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::trace;

use skillcall_core::events::DomainEvent;
use skillcall_core::traits::EventPublisher;

/// Broadcast bus the lifecycle managers publish to.
///
/// Publishing never waits on subscribers. A subscriber that falls more than
/// `capacity` events behind loses the oldest ones.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus holding up to `capacity` undelivered events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl EventPublisher for EventBus {
    async fn publish(&self, event: DomainEvent) {
        if self.tx.send(event).is_err() {
            trace!("Domain event published with no subscribers");
        }
    }
}
