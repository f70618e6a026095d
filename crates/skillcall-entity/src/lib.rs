//! # skillcall-entity
//!
//! Domain records for SkillCall. Every struct in this crate represents a
//! database table row or a value object embedded in one. Table rows derive
//! `sqlx::FromRow` in addition to the serde traits.

pub mod notification;
pub mod request;
pub mod session;
pub mod user;
