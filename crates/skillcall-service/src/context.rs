//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use skillcall_auth::jwt::Claims;
use skillcall_core::types::id::UserId;

/// Context for the current authenticated request.
///
/// Extracted by the API layer and passed into service methods so that
/// every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// Display name used in notification texts and room identities.
    pub display_name: String,
    /// The user's role at the time the token was issued.
    pub role: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            role: "user".to_string(),
            request_time: Utc::now(),
        }
    }

    /// Build a context from verified token claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            display_name: claims.name.clone(),
            role: claims.role.clone(),
            request_time: Utc::now(),
        }
    }
}
