//! User directory lookups.

use async_trait::async_trait;

use skillcall_core::result::AppResult;
use skillcall_core::types::id::UserId;
use skillcall_entity::user::UserProfile;

use super::{PgStore, db_error};
use crate::store::UserDirectory;

#[async_trait]
impl UserDirectory for PgStore {
    async fn find_user(&self, id: &UserId) -> AppResult<Option<UserProfile>> {
        sqlx::query_as::<_, UserProfile>("SELECT id, display_name FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| db_error("Failed to find user", e))
    }
}
