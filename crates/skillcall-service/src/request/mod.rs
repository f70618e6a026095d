//! Request lifecycle: proposals, recipient responses, and expiry.

pub mod service;

pub use service::{AcceptedRequest, CreateRequestInput, RequestLifecycleManager, RespondInput};
