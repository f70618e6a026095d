//! Domain event → notification and signaling mapping.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use skillcall_core::events::{DomainEvent, EventPayload, RequestEvent, SessionEvent};

use crate::gateway::SignalingGateway;
use crate::notification::dispatcher::NotificationDispatcher;
use crate::notification::templates;
use crate::room::{session_room, user_room};

/// Live event telling session members to tear down media.
pub const CALL_ENDED_EVENT: &str = "call-ended";

/// Consumes domain events and turns them into notifications and room events.
#[derive(Debug)]
pub struct EventBridge {
    dispatcher: Arc<NotificationDispatcher>,
    gateway: SignalingGateway,
}

impl EventBridge {
    /// Create a new event bridge
    pub fn new(dispatcher: Arc<NotificationDispatcher>, gateway: SignalingGateway) -> Self {
        Self {
            dispatcher,
            gateway,
        }
    }

    /// Consume events until the bus closes or shutdown is signalled.
    pub async fn run(
        self: Arc<Self>,
        mut events: broadcast::Receiver<DomainEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        info!("Event bridge started");
        loop {
            tokio::select! {
                received = events.recv() => match received {
                    Ok(event) => self.handle(&event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Event bridge lagged, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = shutdown.recv() => {
                    self.drain(&mut events).await;
                    break;
                }
            }
        }
        info!("Event bridge stopped");
    }

    /// Handle every event already queued on the receiver, then return.
    async fn drain(&self, events: &mut broadcast::Receiver<DomainEvent>) {
        let mut drained = 0usize;
        loop {
            match events.try_recv() {
                Ok(event) => {
                    self.handle(&event).await;
                    drained += 1;
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event bridge lagged while draining");
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => break,
            }
        }
        if drained > 0 {
            info!(drained, "Event bridge drained queued events");
        }
    }

    /// Handle one event. Failures are logged, never returned.
    pub async fn handle(&self, event: &DomainEvent) {
        debug!(event_id = %event.id, "Bridging domain event");
        match &event.payload {
            EventPayload::Request(request_event) => self.on_request_event(request_event).await,
            EventPayload::Session(session_event) => self.on_session_event(session_event).await,
        }
    }

    async fn on_request_event(&self, event: &RequestEvent) {
        for draft in templates::for_request_event(event) {
            let recipient = draft.recipient_id.clone();
            if let Err(e) = self.dispatcher.notify(draft).await {
                error!(recipient_id = %recipient, error = %e, "Failed to create notification");
            }
        }

        let (target, name, payload) = match event {
            RequestEvent::Created {
                request_id,
                requester_id,
                recipient_id,
                topic,
                ..
            } => (
                recipient_id,
                "request:created",
                json!({ "requestId": request_id, "requesterId": requester_id, "topic": topic }),
            ),
            RequestEvent::Accepted {
                request_id,
                session_id,
                requester_id,
                call_duration_minutes,
                ..
            } => (
                requester_id,
                "request:accepted",
                json!({
                    "requestId": request_id,
                    "sessionId": session_id,
                    "callDuration": call_duration_minutes,
                }),
            ),
            RequestEvent::Declined {
                request_id,
                requester_id,
                ..
            } => (
                requester_id,
                "request:declined",
                json!({ "requestId": request_id }),
            ),
            RequestEvent::Scheduled {
                request_id,
                requester_id,
                scheduled_time,
                ..
            } => (
                requester_id,
                "request:scheduled",
                json!({ "requestId": request_id, "scheduledTime": scheduled_time }),
            ),
            RequestEvent::StartingSoon { .. } => return,
        };
        self.gateway.publish(&user_room(target), name, payload);
    }

    async fn on_session_event(&self, event: &SessionEvent) {
        for draft in templates::for_session_event(event) {
            let recipient = draft.recipient_id.clone();
            if let Err(e) = self.dispatcher.notify(draft).await {
                error!(recipient_id = %recipient, error = %e, "Failed to create notification");
            }
        }

        match event {
            SessionEvent::Ended {
                session_id,
                ended_by,
                ended_at,
            } => {
                self.gateway.publish(
                    &session_room(session_id),
                    CALL_ENDED_EVENT,
                    json!({ "sessionId": session_id, "endedBy": ended_by, "endedAt": ended_at }),
                );
            }
            SessionEvent::Expired {
                session_id,
                ended_at,
            } => {
                self.gateway.publish(
                    &session_room(session_id),
                    CALL_ENDED_EVENT,
                    json!({
                        "sessionId": session_id,
                        "endedBy": null,
                        "endedAt": ended_at,
                        "reason": "expired",
                    }),
                );
            }
            SessionEvent::Invited { .. }
            | SessionEvent::Started { .. }
            | SessionEvent::Cancelled { .. } => {}
        }
    }
}
