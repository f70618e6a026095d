//! Request handlers organized by domain.

pub mod health;
pub mod notification;
pub mod request;
pub mod session;
pub mod ws;
