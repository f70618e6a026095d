//! Core type definitions used across the SkillCall workspace.

pub mod id;
pub mod pagination;
pub mod priority;
pub mod response;

pub use id::*;
pub use pagination::{PageRequest, PageResponse};
pub use priority::Priority;
