//! In-memory store using a single Tokio mutex.
//!
//! Every trait method takes the one lock for its whole duration, which makes
//! each method atomic with respect to all others. Suitable for tests and
//! single-node development runs only.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use skillcall_core::error::AppError;
use skillcall_core::result::AppResult;
use skillcall_core::types::id::{NotificationId, RequestId, SessionId, UserId};
use skillcall_core::types::pagination::{PageRequest, PageResponse};
use skillcall_entity::notification::{Notification, NotificationFilter, NotificationType};
use skillcall_entity::request::{CallRequest, RequestFilter, RequestStatus};
use skillcall_entity::session::{CallSession, PartySide, SessionStatus};
use skillcall_entity::user::UserProfile;

use super::{
    CallStore, NotificationStore, RequestResponse, RequestStore, SessionStore, SessionTransition,
    UserDirectory,
};

#[derive(Debug, Default)]
struct InnerState {
    users: HashMap<UserId, UserProfile>,
    requests: HashMap<RequestId, CallRequest>,
    sessions: HashMap<SessionId, CallSession>,
    notifications: HashMap<NotificationId, Notification>,
}

impl InnerState {
    fn same_pair(session: &CallSession, a: &UserId, b: &UserId) -> bool {
        (&session.initiator_id == a && &session.participant_id == b)
            || (&session.initiator_id == b && &session.participant_id == a)
    }

    /// Expire overdue sessions of the pair, then refuse if one is still open.
    fn reserve_session_slot(&mut self, session: &CallSession, now: DateTime<Utc>) -> AppResult<()> {
        let (a, b) = (&session.initiator_id, &session.participant_id);
        for existing in self.sessions.values_mut() {
            if Self::same_pair(existing, a, b) && existing.is_overdue(now) {
                expire_session(existing, now);
            }
        }
        let open = self
            .sessions
            .values()
            .any(|s| Self::same_pair(s, a, b) && !s.status.is_terminal());
        if open {
            return Err(AppError::conflict(
                "An open session already exists between these users",
            ));
        }
        Ok(())
    }

    /// The pending, unlapsed request addressed to `recipient_id`.
    fn actionable_request(&mut self, response: &RequestResponse) -> Option<&mut CallRequest> {
        self.requests
            .get_mut(&response.request_id)
            .filter(|r| r.recipient_id == response.recipient_id && r.is_actionable(response.now))
    }
}

fn expire_session(session: &mut CallSession, now: DateTime<Utc>) {
    session.status = SessionStatus::Expired;
    session.end_time = session.forced_end_time();
    session.updated_at = now;
}

fn apply_response(request: &mut CallRequest, response: &RequestResponse) {
    request.status = response.status;
    request.scheduled_time = response.scheduled_time.or(request.scheduled_time);
    request.response_message = response.message.clone();
    request.responded_at = Some(response.now);
    request.updated_at = response.now;
}

fn paginate<T: Clone>(mut rows: Vec<T>, page: PageRequest) -> PageResponse<T> {
    let total = rows.len() as u64;
    let start = (page.offset() as usize).min(rows.len());
    let end = (start + page.limit() as usize).min(rows.len());
    let items = rows.drain(start..end).collect();
    PageResponse::new(items, page, total)
}

/// In-process implementation of every store trait.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user in the directory.
    pub async fn add_user(&self, profile: UserProfile) {
        let mut state = self.state.lock().await;
        state.users.insert(profile.id.clone(), profile);
    }

    /// Overwrite a stored request, for tests that need to move the clock.
    pub async fn put_request(&self, request: CallRequest) {
        let mut state = self.state.lock().await;
        state.requests.insert(request.id.clone(), request);
    }

    /// Overwrite a stored session, for tests that need to move the clock.
    pub async fn put_session(&self, session: CallSession) {
        let mut state = self.state.lock().await;
        state.sessions.insert(session.id.clone(), session);
    }

    /// All notifications addressed to the user, newest first.
    pub async fn notifications_for(&self, user_id: &UserId) -> Vec<Notification> {
        let state = self.state.lock().await;
        let mut rows: Vec<Notification> = state
            .notifications
            .values()
            .filter(|n| &n.recipient_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user(&self, id: &UserId) -> AppResult<Option<UserProfile>> {
        let state = self.state.lock().await;
        Ok(state.users.get(id).cloned())
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn insert_request(&self, request: &CallRequest) -> AppResult<CallRequest> {
        let mut state = self.state.lock().await;
        let now = request.created_at;
        let mut blocked = false;
        for existing in state.requests.values_mut() {
            if existing.requester_id != request.requester_id
                || existing.recipient_id != request.recipient_id
                || existing.status != RequestStatus::Pending
            {
                continue;
            }
            if existing.is_lapsed(now) {
                existing.status = RequestStatus::Expired;
                existing.updated_at = now;
            } else {
                blocked = true;
            }
        }
        if blocked {
            return Err(AppError::conflict(
                "A pending request to this user already exists",
            ));
        }
        state.requests.insert(request.id.clone(), request.clone());
        Ok(request.clone())
    }

    async fn find_request(&self, id: &RequestId) -> AppResult<Option<CallRequest>> {
        let state = self.state.lock().await;
        Ok(state.requests.get(id).cloned())
    }

    async fn list_requests(
        &self,
        filter: &RequestFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<CallRequest>> {
        let state = self.state.lock().await;
        let mut rows: Vec<CallRequest> = state
            .requests
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(rows, page))
    }

    async fn count_actionable_for_recipient(
        &self,
        recipient_id: &UserId,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let state = self.state.lock().await;
        Ok(state
            .requests
            .values()
            .filter(|r| &r.recipient_id == recipient_id && r.is_actionable(now))
            .count() as u64)
    }

    async fn respond_to_request(
        &self,
        response: &RequestResponse,
    ) -> AppResult<Option<CallRequest>> {
        let mut state = self.state.lock().await;
        Ok(state.actionable_request(response).map(|request| {
            apply_response(request, response);
            request.clone()
        }))
    }

    async fn accept_request(
        &self,
        response: &RequestResponse,
        session: &CallSession,
    ) -> AppResult<Option<(CallRequest, CallSession)>> {
        let mut state = self.state.lock().await;
        if state.actionable_request(response).is_none() {
            return Ok(None);
        }
        state.reserve_session_slot(session, response.now)?;

        let request = match state.actionable_request(response) {
            Some(request) => {
                apply_response(request, response);
                request.session_id = Some(session.id.clone());
                request.clone()
            }
            None => return Ok(None),
        };
        state.sessions.insert(session.id.clone(), session.clone());
        Ok(Some((request, session.clone())))
    }

    async fn expire_requests(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut expired = 0;
        for request in state.requests.values_mut().filter(|r| r.is_lapsed(now)) {
            request.status = RequestStatus::Expired;
            request.updated_at = now;
            expired += 1;
        }
        debug!(expired, "Expired lapsed requests");
        Ok(expired)
    }

    async fn claim_due_reminders(
        &self,
        now: DateTime<Utc>,
        horizon: DateTime<Utc>,
    ) -> AppResult<Vec<CallRequest>> {
        let mut state = self.state.lock().await;
        let mut claimed = Vec::new();
        for request in state.requests.values_mut() {
            let due = request.status == RequestStatus::Scheduled
                && request.reminder_sent_at.is_none()
                && request
                    .scheduled_time
                    .is_some_and(|t| t > now && t <= horizon);
            if due {
                request.reminder_sent_at = Some(now);
                claimed.push(request.clone());
            }
        }
        Ok(claimed)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert_session(&self, session: &CallSession) -> AppResult<CallSession> {
        let mut state = self.state.lock().await;
        state.reserve_session_slot(session, session.created_at)?;
        state.sessions.insert(session.id.clone(), session.clone());
        Ok(session.clone())
    }

    async fn find_session(&self, id: &SessionId) -> AppResult<Option<CallSession>> {
        let state = self.state.lock().await;
        Ok(state.sessions.get(id).cloned())
    }

    async fn list_sessions(
        &self,
        user_id: &UserId,
        status: Option<SessionStatus>,
        page: PageRequest,
    ) -> AppResult<PageResponse<CallSession>> {
        let state = self.state.lock().await;
        let mut rows: Vec<CallSession> = state
            .sessions
            .values()
            .filter(|s| s.is_party(user_id) && status.is_none_or(|st| st == s.status))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(rows, page))
    }

    async fn transition_session(
        &self,
        id: &SessionId,
        transition: SessionTransition,
        now: DateTime<Utc>,
    ) -> AppResult<Option<CallSession>> {
        let mut state = self.state.lock().await;
        let Some(session) = state.sessions.get_mut(id) else {
            return Ok(None);
        };
        if session.status != transition.from_status() || session.is_overdue(now) {
            return Ok(None);
        }
        session.status = transition.to_status();
        session.updated_at = now;
        match transition {
            SessionTransition::Start => session.start_time = Some(now),
            SessionTransition::Complete => session.end_time = Some(now),
            SessionTransition::Cancel => {}
        }
        Ok(Some(session.clone()))
    }

    async fn assign_room(
        &self,
        id: &SessionId,
        room_name: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<CallSession>> {
        let mut state = self.state.lock().await;
        Ok(state.sessions.get_mut(id).map(|session| {
            if session.room_name.is_none() {
                session.room_name = Some(room_name.to_string());
                session.call_started_at = Some(now);
                session.updated_at = now;
            }
            session.clone()
        }))
    }

    async fn save_feedback(
        &self,
        id: &SessionId,
        side: PartySide,
        rating: i16,
        feedback: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<CallSession>> {
        let mut state = self.state.lock().await;
        let Some(session) = state
            .sessions
            .get_mut(id)
            .filter(|s| s.status == SessionStatus::Completed)
        else {
            return Ok(None);
        };
        match side {
            PartySide::Initiator => {
                session.initiator_rating = Some(rating);
                session.initiator_feedback = feedback;
            }
            PartySide::Participant => {
                session.participant_rating = Some(rating);
                session.participant_feedback = feedback;
            }
        }
        session.updated_at = now;
        Ok(Some(session.clone()))
    }

    async fn expire_sessions(&self, now: DateTime<Utc>) -> AppResult<Vec<CallSession>> {
        let mut state = self.state.lock().await;
        let mut expired = Vec::new();
        for session in state.sessions.values_mut().filter(|s| s.is_overdue(now)) {
            expire_session(session, now);
            expired.push(session.clone());
        }
        Ok(expired)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(&self, notification: &Notification) -> AppResult<Notification> {
        let mut state = self.state.lock().await;
        state
            .notifications
            .insert(notification.id.clone(), notification.clone());
        Ok(notification.clone())
    }

    async fn list_notifications(
        &self,
        filter: &NotificationFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Notification> = state
            .notifications
            .values()
            .filter(|n| filter.matches(n))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(rows, page))
    }

    async fn count_unread(
        &self,
        recipient_id: &UserId,
        kind: Option<NotificationType>,
    ) -> AppResult<u64> {
        let filter = NotificationFilter {
            recipient_id: recipient_id.clone(),
            kind,
            is_read: Some(false),
        };
        let state = self.state.lock().await;
        Ok(state
            .notifications
            .values()
            .filter(|n| filter.matches(n))
            .count() as u64)
    }

    async fn mark_read(
        &self,
        id: &NotificationId,
        recipient_id: &UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Notification>> {
        let mut state = self.state.lock().await;
        Ok(state
            .notifications
            .get_mut(id)
            .filter(|n| &n.recipient_id == recipient_id)
            .map(|n| {
                n.mark_read(now);
                n.clone()
            }))
    }

    async fn mark_all_read(&self, recipient_id: &UserId, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut changed = 0;
        for n in state
            .notifications
            .values_mut()
            .filter(|n| &n.recipient_id == recipient_id && !n.is_read)
        {
            n.mark_read(now);
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete_notification(
        &self,
        id: &NotificationId,
        recipient_id: &UserId,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let owned = state
            .notifications
            .get(id)
            .is_some_and(|n| &n.recipient_id == recipient_id);
        if owned {
            state.notifications.remove(id);
        }
        Ok(owned)
    }

    async fn mark_delivered_in_app(&self, id: &NotificationId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(n) = state.notifications.get_mut(id) {
            n.delivery_status.0.in_app = true;
        }
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.notifications.len();
        state.notifications.retain(|_, n| !n.is_expired(now));
        Ok((before - state.notifications.len()) as u64)
    }
}

#[async_trait]
impl CallStore for MemoryStore {
    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Shift every timestamp of a session back by `by`, for clock-dependent tests.
pub fn rewind_session(session: &mut CallSession, by: Duration) {
    session.created_at -= by;
    session.updated_at -= by;
    session.start_time = session.start_time.map(|t| t - by);
    session.end_time = session.end_time.map(|t| t - by);
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillcall_core::error::ErrorKind;
    use skillcall_core::types::Priority;
    use skillcall_entity::request::NewCallRequest;
    use skillcall_entity::session::{NewCallSession, SessionOrigin};

    fn request(from: &str, to: &str, now: DateTime<Utc>) -> CallRequest {
        CallRequest::propose(
            NewCallRequest {
                requester_id: UserId::from(from),
                recipient_id: UserId::from(to),
                topic: "Rust lifetimes".to_string(),
                description: String::new(),
                skill_to_teach: None,
                skill_to_learn: None,
                priority: Priority::Medium,
                preferred_time: None,
                requested_duration_minutes: 10,
            },
            now,
            Duration::days(7),
        )
    }

    fn session(from: &str, to: &str, origin: SessionOrigin, now: DateTime<Utc>) -> CallSession {
        CallSession::open(
            NewCallSession {
                initiator_id: UserId::from(from),
                participant_id: UserId::from(to),
                topic: "Rust lifetimes".to_string(),
                description: String::new(),
                skill_to_teach: None,
                skill_to_learn: None,
                origin,
                start_time: None,
                duration_cap_minutes: 15,
            },
            now,
        )
    }

    fn accept(req: &CallRequest, now: DateTime<Utc>) -> RequestResponse {
        RequestResponse {
            request_id: req.id.clone(),
            recipient_id: req.recipient_id.clone(),
            status: RequestStatus::Accepted,
            scheduled_time: None,
            message: None,
            now,
        }
    }

    #[tokio::test]
    async fn test_pending_pair_is_directional() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.insert_request(&request("a", "b", now)).await.expect("first");

        let err = store
            .insert_request(&request("a", "b", now))
            .await
            .expect_err("duplicate");
        assert_eq!(err.kind, ErrorKind::Conflict);

        store
            .insert_request(&request("b", "a", now))
            .await
            .expect("reverse direction is independent");
    }

    #[tokio::test]
    async fn test_lapsed_request_frees_the_slot() {
        let store = MemoryStore::new();
        let past = Utc::now() - Duration::days(8);
        let old = request("a", "b", past);
        store.insert_request(&old).await.expect("old");

        store
            .insert_request(&request("a", "b", Utc::now()))
            .await
            .expect("lapsed request must not block");
        let old = store.find_request(&old.id).await.expect("find").expect("exists");
        assert_eq!(old.status, RequestStatus::Expired);
    }

    #[tokio::test]
    async fn test_accept_writes_both_or_nothing() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let req = request("a", "b", now);
        store.insert_request(&req).await.expect("insert");

        let blocker = session("b", "a", SessionOrigin::Direct, now);
        store.insert_session(&blocker).await.expect("blocker");

        let spawned = session("a", "b", SessionOrigin::FromRequest(req.id.clone()), now);
        let err = store
            .accept_request(&accept(&req, now), &spawned)
            .await
            .expect_err("open pair session");
        assert_eq!(err.kind, ErrorKind::Conflict);

        let stored = store.find_request(&req.id).await.expect("find").expect("exists");
        assert_eq!(stored.status, RequestStatus::Pending);
        assert!(store.find_session(&spawned.id).await.expect("find").is_none());
    }

    #[tokio::test]
    async fn test_accept_links_request_and_session() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let req = request("a", "b", now);
        store.insert_request(&req).await.expect("insert");
        let spawned = session("a", "b", SessionOrigin::FromRequest(req.id.clone()), now);

        let (accepted, created) = store
            .accept_request(&accept(&req, now), &spawned)
            .await
            .expect("accept")
            .expect("applied");
        assert_eq!(accepted.status, RequestStatus::Accepted);
        assert_eq!(accepted.session_id.as_ref(), Some(&created.id));

        let again = store
            .accept_request(&accept(&req, now), &session("a", "b", SessionOrigin::Direct, now))
            .await
            .expect("second accept");
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_complete_refused_when_overdue() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let mut s = session("a", "b", SessionOrigin::FromRequest(RequestId::from("r")), now);
        rewind_session(&mut s, Duration::minutes(16));
        store.put_session(s.clone()).await;

        let done = store
            .transition_session(&s.id, SessionTransition::Complete, now)
            .await
            .expect("transition");
        assert!(done.is_none());

        let expired = store.expire_sessions(now).await.expect("sweep");
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].status, SessionStatus::Expired);
    }

    #[tokio::test]
    async fn test_room_name_is_memoized() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let s = session("a", "b", SessionOrigin::Direct, now);
        store.insert_session(&s).await.expect("insert");

        let first = store.assign_room(&s.id, "room-1", now).await.expect("assign");
        let second = store.assign_room(&s.id, "room-2", now).await.expect("assign");
        assert_eq!(first.and_then(|s| s.room_name).as_deref(), Some("room-1"));
        assert_eq!(second.and_then(|s| s.room_name).as_deref(), Some("room-1"));
    }
}
