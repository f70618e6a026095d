//! # skillcall-database
//!
//! Storage for call requests, call sessions, and notifications. The
//! [`store`] module defines the traits the services depend on; the
//! [`repositories`] module implements them on PostgreSQL and
//! [`store::memory`] implements them in process.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::connect_pool;
pub use repositories::PgStore;
pub use store::{
    CallStore, MemoryStore, NotificationStore, RequestResponse, RequestStore, SessionStore,
    SessionTransition, UserDirectory,
};
