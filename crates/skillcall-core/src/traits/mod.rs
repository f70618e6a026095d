//! Core traits defined in `skillcall-core` and implemented by other crates.

pub mod event_publisher;

pub use event_publisher::EventPublisher;
