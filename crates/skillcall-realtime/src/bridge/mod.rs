//! Domain events in, notifications and room broadcasts out.

pub mod bus;
pub mod event_bridge;

pub use bus::EventBus;
pub use event_bridge::EventBridge;
