//! Minimal user profile.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use skillcall_core::types::id::UserId;

/// The slice of a user record needed to address and greet them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    /// Identity shared with the authentication layer.
    pub id: UserId,
    /// Name used in notification text.
    pub display_name: String,
}

impl UserProfile {
    /// Build a profile.
    pub fn new(id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}
