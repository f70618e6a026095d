//! Call session queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use skillcall_core::result::AppResult;
use skillcall_core::types::id::{SessionId, UserId};
use skillcall_core::types::pagination::{PageRequest, PageResponse};
use skillcall_entity::session::{CallSession, PartySide, SessionStatus};

use super::{PgStore, db_error, db_error_or_conflict};
use crate::store::{SessionStore, SessionTransition};

const OPEN_PAIR_CONFLICT: &str = "An open session already exists between these users";

/// Insert a session on an existing connection or transaction.
///
/// Overdue active sessions of the same unordered pair are closed first so
/// that the partial unique index only ever sees truly open sessions.
pub(crate) async fn insert_session_on(
    conn: &mut PgConnection,
    session: &CallSession,
) -> AppResult<CallSession> {
    sqlx::query(
        "UPDATE call_sessions \
         SET status = 'expired', \
             end_time = start_time + make_interval(mins => duration_cap_minutes), \
             updated_at = $3 \
         WHERE LEAST(initiator_id, participant_id) = LEAST($1::text, $2::text) \
           AND GREATEST(initiator_id, participant_id) = GREATEST($1::text, $2::text) \
           AND status = 'active' \
           AND start_time + make_interval(mins => duration_cap_minutes) <= $3",
    )
    .bind(&session.initiator_id)
    .bind(&session.participant_id)
    .bind(session.created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to expire overdue sessions", e))?;

    sqlx::query_as::<_, CallSession>(
        "INSERT INTO call_sessions (id, initiator_id, participant_id, roster, request_id, status, \
         topic, description, skill_to_teach, skill_to_learn, start_time, end_time, \
         duration_cap_minutes, room_token, room_name, call_started_at, initiator_rating, \
         initiator_feedback, participant_rating, participant_feedback, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
         $18, $19, $20, $21, $22) RETURNING *",
    )
    .bind(&session.id)
    .bind(&session.initiator_id)
    .bind(&session.participant_id)
    .bind(&session.roster)
    .bind(&session.request_id)
    .bind(session.status)
    .bind(&session.topic)
    .bind(&session.description)
    .bind(&session.skill_to_teach)
    .bind(&session.skill_to_learn)
    .bind(session.start_time)
    .bind(session.end_time)
    .bind(session.duration_cap_minutes)
    .bind(&session.room_token)
    .bind(&session.room_name)
    .bind(session.call_started_at)
    .bind(session.initiator_rating)
    .bind(&session.initiator_feedback)
    .bind(session.participant_rating)
    .bind(&session.participant_feedback)
    .bind(session.created_at)
    .bind(session.updated_at)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| db_error_or_conflict("Failed to create session", OPEN_PAIR_CONFLICT, e))
}

#[async_trait]
impl SessionStore for PgStore {
    async fn insert_session(&self, session: &CallSession) -> AppResult<CallSession> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;
        let created = insert_session_on(&mut tx, session).await?;
        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit session", e))?;
        Ok(created)
    }

    async fn find_session(&self, id: &SessionId) -> AppResult<Option<CallSession>> {
        sqlx::query_as::<_, CallSession>("SELECT * FROM call_sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| db_error("Failed to find session", e))
    }

    async fn list_sessions(
        &self,
        user_id: &UserId,
        status: Option<SessionStatus>,
        page: PageRequest,
    ) -> AppResult<PageResponse<CallSession>> {
        const PARTY: &str = "(initiator_id = $1 OR participant_id = $1 OR $1 = ANY(roster)) \
                             AND ($2::session_status IS NULL OR status = $2)";

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM call_sessions WHERE {PARTY}"))
                .bind(user_id)
                .bind(status)
                .fetch_one(self.pool())
                .await
                .map_err(|e| db_error("Failed to count sessions", e))?;

        let rows = sqlx::query_as::<_, CallSession>(&format!(
            "SELECT * FROM call_sessions WHERE {PARTY} \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        ))
        .bind(user_id)
        .bind(status)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_error("Failed to list sessions", e))?;

        Ok(PageResponse::new(rows, page, total as u64))
    }

    async fn transition_session(
        &self,
        id: &SessionId,
        transition: SessionTransition,
        now: DateTime<Utc>,
    ) -> AppResult<Option<CallSession>> {
        let sql = match transition {
            SessionTransition::Start => {
                "UPDATE call_sessions SET status = 'active', start_time = $2, updated_at = $2 \
                 WHERE id = $1 AND status = 'pending' RETURNING *"
            }
            SessionTransition::Complete => {
                "UPDATE call_sessions SET status = 'completed', end_time = $2, updated_at = $2 \
                 WHERE id = $1 AND status = 'active' \
                   AND start_time + make_interval(mins => duration_cap_minutes) > $2 \
                 RETURNING *"
            }
            SessionTransition::Cancel => {
                "UPDATE call_sessions SET status = 'cancelled', updated_at = $2 \
                 WHERE id = $1 AND status = 'pending' RETURNING *"
            }
        };

        sqlx::query_as::<_, CallSession>(sql)
            .bind(id)
            .bind(now)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| db_error("Failed to update session status", e))
    }

    async fn assign_room(
        &self,
        id: &SessionId,
        room_name: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<CallSession>> {
        sqlx::query_as::<_, CallSession>(
            "UPDATE call_sessions \
             SET room_name = COALESCE(room_name, $2), \
                 call_started_at = COALESCE(call_started_at, $3), \
                 updated_at = CASE WHEN room_name IS NULL THEN $3 ELSE updated_at END \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(room_name)
        .bind(now)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| db_error("Failed to assign room", e))
    }

    async fn save_feedback(
        &self,
        id: &SessionId,
        side: PartySide,
        rating: i16,
        feedback: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<CallSession>> {
        let sql = match side {
            PartySide::Initiator => {
                "UPDATE call_sessions \
                 SET initiator_rating = $2, initiator_feedback = $3, updated_at = $4 \
                 WHERE id = $1 AND status = 'completed' RETURNING *"
            }
            PartySide::Participant => {
                "UPDATE call_sessions \
                 SET participant_rating = $2, participant_feedback = $3, updated_at = $4 \
                 WHERE id = $1 AND status = 'completed' RETURNING *"
            }
        };

        sqlx::query_as::<_, CallSession>(sql)
            .bind(id)
            .bind(rating)
            .bind(feedback)
            .bind(now)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| db_error("Failed to save feedback", e))
    }

    async fn expire_sessions(&self, now: DateTime<Utc>) -> AppResult<Vec<CallSession>> {
        sqlx::query_as::<_, CallSession>(
            "UPDATE call_sessions \
             SET status = 'expired', \
                 end_time = start_time + make_interval(mins => duration_cap_minutes), \
                 updated_at = $1 \
             WHERE status = 'active' \
               AND start_time + make_interval(mins => duration_cap_minutes) <= $1 \
             RETURNING *",
        )
        .bind(now)
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_error("Failed to expire sessions", e))
    }
}
