//! The per-entity authorization check.
//!
//! Callers pass the verified actor, the loaded entity, and the intended
//! action. The check never fails; a [`AccessDecision::Deny`] is turned into
//! an error by the caller with whichever kind fits the operation.

pub mod checker;

pub use checker::{AccessDecision, Guarded, RequestAction, SessionAction, can_act};
