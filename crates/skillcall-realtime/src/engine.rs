//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use chrono::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

use skillcall_core::config::call::CallConfig;
use skillcall_core::config::realtime::RealtimeConfig;
use skillcall_database::CallStore;

use crate::bridge::{EventBridge, EventBus};
use crate::connection::ConnectionManager;
use crate::gateway::SignalingGateway;
use crate::notification::NotificationDispatcher;
use crate::room::RoomRegistry;

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Room registry.
    pub rooms: Arc<RoomRegistry>,
    /// Signaling gateway.
    pub gateway: SignalingGateway,
    /// Notification dispatcher.
    pub notifications: Arc<NotificationDispatcher>,
    /// Domain event bus the lifecycle managers publish to.
    pub bus: Arc<EventBus>,
    /// Event bridge (domain events → notifications and room events).
    pub event_bridge: Arc<EventBridge>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(config: &RealtimeConfig, call: &CallConfig, store: Arc<dyn CallStore>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let rooms = Arc::new(RoomRegistry::new());
        let connections = Arc::new(ConnectionManager::new(config.clone(), rooms.clone()));
        let gateway = SignalingGateway::new(connections.clone());
        let notifications = Arc::new(NotificationDispatcher::new(
            store,
            gateway.clone(),
            Duration::days(call.notification_ttl_days),
        ));
        let bus = Arc::new(EventBus::new(config.event_bus_capacity));
        let event_bridge = Arc::new(EventBridge::new(notifications.clone(), gateway.clone()));

        info!("Real-time engine initialized");

        Self {
            connections,
            rooms,
            gateway,
            notifications,
            bus,
            event_bridge,
            shutdown_tx,
        }
    }

    /// Spawn the event bridge. Events published before this call are lost.
    pub fn start(&self) -> JoinHandle<()> {
        let events = self.bus.subscribe();
        let shutdown = self.shutdown_tx.subscribe();
        tokio::spawn(self.event_bridge.clone().run(events, shutdown))
    }

    /// Stops the bridge and closes every connection.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        let _ = self.shutdown_tx.send(());
        self.connections.close_all();
        info!("Real-time engine shut down");
    }
}
