//! Call request queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use skillcall_core::result::AppResult;
use skillcall_core::types::id::{RequestId, UserId};
use skillcall_core::types::pagination::{PageRequest, PageResponse};
use skillcall_entity::request::{CallRequest, RequestDirection, RequestFilter};
use skillcall_entity::session::CallSession;

use super::session::insert_session_on;
use super::{PgStore, db_error, db_error_or_conflict};
use crate::store::{RequestResponse, RequestStore};

const PENDING_PAIR_CONFLICT: &str = "A pending request to this user already exists";

/// Apply a response to a pending, unlapsed request addressed to the recipient.
async fn respond_on(
    conn: &mut PgConnection,
    response: &RequestResponse,
) -> AppResult<Option<CallRequest>> {
    sqlx::query_as::<_, CallRequest>(
        "UPDATE call_requests \
         SET status = $3, \
             scheduled_time = COALESCE($4, scheduled_time), \
             response_message = $5, \
             responded_at = $6, \
             updated_at = $6 \
         WHERE id = $1 AND recipient_id = $2 AND status = 'pending' AND expires_at >= $6 \
         RETURNING *",
    )
    .bind(&response.request_id)
    .bind(&response.recipient_id)
    .bind(response.status)
    .bind(response.scheduled_time)
    .bind(&response.message)
    .bind(response.now)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to respond to request", e))
}

fn direction_clause(direction: RequestDirection) -> &'static str {
    match direction {
        RequestDirection::Sent => "requester_id = $1",
        RequestDirection::Received => "recipient_id = $1",
        RequestDirection::All => "(requester_id = $1 OR recipient_id = $1)",
    }
}

#[async_trait]
impl RequestStore for PgStore {
    async fn insert_request(&self, request: &CallRequest) -> AppResult<CallRequest> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        sqlx::query(
            "UPDATE call_requests SET status = 'expired', updated_at = $3 \
             WHERE requester_id = $1 AND recipient_id = $2 \
               AND status = 'pending' AND expires_at < $3",
        )
        .bind(&request.requester_id)
        .bind(&request.recipient_id)
        .bind(request.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to expire lapsed requests", e))?;

        let created = sqlx::query_as::<_, CallRequest>(
            "INSERT INTO call_requests (id, requester_id, recipient_id, topic, description, \
             skill_to_teach, skill_to_learn, priority, status, preferred_time, scheduled_time, \
             requested_duration_minutes, response_message, session_id, reminder_sent_at, \
             created_at, updated_at, responded_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18, $19) RETURNING *",
        )
        .bind(&request.id)
        .bind(&request.requester_id)
        .bind(&request.recipient_id)
        .bind(&request.topic)
        .bind(&request.description)
        .bind(&request.skill_to_teach)
        .bind(&request.skill_to_learn)
        .bind(request.priority)
        .bind(request.status)
        .bind(request.preferred_time)
        .bind(request.scheduled_time)
        .bind(request.requested_duration_minutes)
        .bind(&request.response_message)
        .bind(&request.session_id)
        .bind(request.reminder_sent_at)
        .bind(request.created_at)
        .bind(request.updated_at)
        .bind(request.responded_at)
        .bind(request.expires_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error_or_conflict("Failed to create request", PENDING_PAIR_CONFLICT, e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit request", e))?;
        Ok(created)
    }

    async fn find_request(&self, id: &RequestId) -> AppResult<Option<CallRequest>> {
        sqlx::query_as::<_, CallRequest>("SELECT * FROM call_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| db_error("Failed to find request", e))
    }

    async fn list_requests(
        &self,
        filter: &RequestFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<CallRequest>> {
        // Lapsed pending rows filter as expired before the sweep rewrites them.
        let predicate = format!(
            "{} AND ($2::request_status IS NULL OR \
             (CASE WHEN status = 'pending' AND expires_at < $3 \
              THEN 'expired'::request_status ELSE status END) = $2)",
            direction_clause(filter.direction)
        );

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM call_requests WHERE {predicate}"))
                .bind(&filter.user_id)
                .bind(filter.status)
                .bind(filter.now)
                .fetch_one(self.pool())
                .await
                .map_err(|e| db_error("Failed to count requests", e))?;

        let rows = sqlx::query_as::<_, CallRequest>(&format!(
            "SELECT * FROM call_requests WHERE {predicate} \
             ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5"
        ))
        .bind(&filter.user_id)
        .bind(filter.status)
        .bind(filter.now)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_error("Failed to list requests", e))?;

        Ok(PageResponse::new(rows, page, total as u64))
    }

    async fn count_actionable_for_recipient(
        &self,
        recipient_id: &UserId,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM call_requests \
             WHERE recipient_id = $1 AND status = 'pending' AND expires_at >= $2",
        )
        .bind(recipient_id)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(|e| db_error("Failed to count pending requests", e))?;
        Ok(count as u64)
    }

    async fn respond_to_request(
        &self,
        response: &RequestResponse,
    ) -> AppResult<Option<CallRequest>> {
        let mut conn = self
            .pool()
            .acquire()
            .await
            .map_err(|e| db_error("Failed to acquire connection", e))?;
        respond_on(&mut conn, response).await
    }

    async fn accept_request(
        &self,
        response: &RequestResponse,
        session: &CallSession,
    ) -> AppResult<Option<(CallRequest, CallSession)>> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        // Lock the request row first so concurrent accepts serialize here.
        if respond_on(&mut tx, response).await?.is_none() {
            tx.rollback()
                .await
                .map_err(|e| db_error("Failed to roll back", e))?;
            return Ok(None);
        }

        let created = insert_session_on(&mut tx, session).await?;

        let accepted = sqlx::query_as::<_, CallRequest>(
            "UPDATE call_requests SET session_id = $2 WHERE id = $1 RETURNING *",
        )
        .bind(&response.request_id)
        .bind(&created.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to link session to request", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit acceptance", e))?;
        Ok(Some((accepted, created)))
    }

    async fn expire_requests(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE call_requests SET status = 'expired', updated_at = $1 \
             WHERE status = 'pending' AND expires_at < $1",
        )
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(|e| db_error("Failed to expire requests", e))?;
        Ok(result.rows_affected())
    }

    async fn claim_due_reminders(
        &self,
        now: DateTime<Utc>,
        horizon: DateTime<Utc>,
    ) -> AppResult<Vec<CallRequest>> {
        sqlx::query_as::<_, CallRequest>(
            "UPDATE call_requests SET reminder_sent_at = $1 \
             WHERE status = 'scheduled' AND reminder_sent_at IS NULL \
               AND scheduled_time > $1 AND scheduled_time <= $2 \
             RETURNING *",
        )
        .bind(now)
        .bind(horizon)
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_error("Failed to claim reminders", e))
    }
}
