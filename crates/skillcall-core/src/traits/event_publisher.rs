//! Seam between the lifecycle managers and whoever reacts to their events.

use async_trait::async_trait;

use crate::events::DomainEvent;

/// Sink for domain events.
///
/// Publishing never fails from the caller's point of view: delivery is
/// best-effort and must not block the triggering operation. The realtime
/// crate provides an in-process broadcast bus; tests use a recorder.
#[async_trait]
pub trait EventPublisher: Send + Sync + 'static {
    /// Hand an event to the subscribers.
    async fn publish(&self, event: DomainEvent);
}
