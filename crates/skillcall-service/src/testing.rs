//! Shared fixtures for service unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use skillcall_auth::room::LiveKitTokenIssuer;
use skillcall_core::config::call::{CallConfig, RoomConfig};
use skillcall_core::events::DomainEvent;
use skillcall_core::traits::EventPublisher;
use skillcall_database::MemoryStore;
use skillcall_entity::user::UserProfile;

use crate::request::RequestLifecycleManager;
use crate::session::SessionLifecycleManager;

/// Publisher that keeps every event for later inspection.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    pub events: Mutex<Vec<DomainEvent>>,
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: DomainEvent) {
        self.events.lock().await.push(event);
    }
}

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub events: Arc<RecordingPublisher>,
    pub sessions: Arc<SessionLifecycleManager>,
    pub requests: RequestLifecycleManager,
}

pub async fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    for (id, name) in [("u1", "Ada"), ("u2", "Grace"), ("u3", "Linus")] {
        store.add_user(UserProfile::new(id, name)).await;
    }
    let events = Arc::new(RecordingPublisher::default());
    let config = CallConfig::default();
    let sessions = Arc::new(SessionLifecycleManager::new(
        store.clone(),
        events.clone(),
        Arc::new(LiveKitTokenIssuer::new(&RoomConfig::default())),
        config.clone(),
    ));
    let requests =
        RequestLifecycleManager::new(store.clone(), events.clone(), sessions.clone(), config);
    Fixture {
        store,
        events,
        sessions,
        requests,
    }
}
