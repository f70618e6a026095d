//! Store traits used by the lifecycle services.
//!
//! Every mutation that must respect a state precondition is expressed as a
//! conditional write: the store applies it only when the stored row still
//! satisfies the precondition and returns `None` otherwise. Uniqueness rules
//! (one pending request per ordered pair, one open session per unordered
//! pair) surface as [`ErrorKind::Conflict`](skillcall_core::error::ErrorKind).
//!
//! Two implementations are provided:
//! - PostgreSQL repositories in [`crate::repositories`]
//! - [`memory::MemoryStore`], a single-mutex store for tests and local runs

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use skillcall_core::result::AppResult;
use skillcall_core::types::id::{NotificationId, RequestId, SessionId, UserId};
use skillcall_core::types::pagination::{PageRequest, PageResponse};
use skillcall_entity::notification::{Notification, NotificationFilter, NotificationType};
use skillcall_entity::request::{CallRequest, RequestFilter, RequestStatus};
use skillcall_entity::session::{CallSession, PartySide, SessionStatus};
use skillcall_entity::user::UserProfile;

pub use memory::MemoryStore;

/// Lookup into the external user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Resolve a user, `None` when unknown.
    async fn find_user(&self, id: &UserId) -> AppResult<Option<UserProfile>>;
}

/// A recipient's answer to a pending request.
#[derive(Debug, Clone)]
pub struct RequestResponse {
    /// The request being answered.
    pub request_id: RequestId,
    /// Must match the stored recipient.
    pub recipient_id: UserId,
    /// Target status: accepted, declined, or scheduled.
    pub status: RequestStatus,
    /// Agreed time, for accept and schedule.
    pub scheduled_time: Option<DateTime<Utc>>,
    /// Optional message from the recipient.
    pub message: Option<String>,
    /// Wall clock of the response; the request must not be lapsed at it.
    pub now: DateTime<Utc>,
}

/// Persistence of call requests.
#[async_trait]
pub trait RequestStore: Send + Sync + 'static {
    /// Insert a new pending request.
    ///
    /// Lapsed pending requests for the same ordered pair are expired first;
    /// a still-live pending request for the pair yields `Conflict`.
    async fn insert_request(&self, request: &CallRequest) -> AppResult<CallRequest>;

    /// Fetch a request by id.
    async fn find_request(&self, id: &RequestId) -> AppResult<Option<CallRequest>>;

    /// List requests newest first.
    async fn list_requests(
        &self,
        filter: &RequestFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<CallRequest>>;

    /// Pending, unlapsed requests addressed to the user.
    async fn count_actionable_for_recipient(
        &self,
        recipient_id: &UserId,
        now: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Decline or schedule a pending request. `None` when the request is
    /// missing, not addressed to the recipient, no longer pending, or lapsed.
    async fn respond_to_request(&self, response: &RequestResponse)
    -> AppResult<Option<CallRequest>>;

    /// Accept a pending request and insert its session as one atomic unit.
    ///
    /// `None` under the same conditions as [`Self::respond_to_request`], in
    /// which case nothing is written. An open session for the pair yields
    /// `Conflict` and also writes nothing.
    async fn accept_request(
        &self,
        response: &RequestResponse,
        session: &CallSession,
    ) -> AppResult<Option<(CallRequest, CallSession)>>;

    /// Rewrite every lapsed pending request to expired.
    async fn expire_requests(&self, now: DateTime<Utc>) -> AppResult<u64>;

    /// Claim scheduled requests starting in `(now, horizon]` whose reminder
    /// has not gone out, stamping them so no other worker claims them.
    async fn claim_due_reminders(
        &self,
        now: DateTime<Utc>,
        horizon: DateTime<Utc>,
    ) -> AppResult<Vec<CallRequest>>;
}

/// Conditional session state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTransition {
    /// pending to active, stamping the start time.
    Start,
    /// active (and within its cap) to completed, stamping the end time.
    Complete,
    /// pending to cancelled.
    Cancel,
}

impl SessionTransition {
    /// Stored status the transition requires.
    pub fn from_status(&self) -> SessionStatus {
        match self {
            Self::Start | Self::Cancel => SessionStatus::Pending,
            Self::Complete => SessionStatus::Active,
        }
    }

    /// Stored status the transition produces.
    pub fn to_status(&self) -> SessionStatus {
        match self {
            Self::Start => SessionStatus::Active,
            Self::Complete => SessionStatus::Completed,
            Self::Cancel => SessionStatus::Cancelled,
        }
    }
}

/// Persistence of call sessions.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Insert a new session.
    ///
    /// Overdue active sessions for the same unordered pair are expired
    /// first; a remaining open session for the pair yields `Conflict`.
    async fn insert_session(&self, session: &CallSession) -> AppResult<CallSession>;

    /// Fetch a session by id.
    async fn find_session(&self, id: &SessionId) -> AppResult<Option<CallSession>>;

    /// Sessions the user is party to, newest first.
    async fn list_sessions(
        &self,
        user_id: &UserId,
        status: Option<SessionStatus>,
        page: PageRequest,
    ) -> AppResult<PageResponse<CallSession>>;

    /// Apply a transition if the stored status allows it at `now`.
    async fn transition_session(
        &self,
        id: &SessionId,
        transition: SessionTransition,
        now: DateTime<Utc>,
    ) -> AppResult<Option<CallSession>>;

    /// Set the media room name unless one is already stored, returning the
    /// session with whichever name won.
    async fn assign_room(
        &self,
        id: &SessionId,
        room_name: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<CallSession>>;

    /// Store one side's rating on a completed session, overwriting any
    /// previous submission from that side.
    async fn save_feedback(
        &self,
        id: &SessionId,
        side: PartySide,
        rating: i16,
        feedback: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<CallSession>>;

    /// Rewrite every overdue active session to expired and return them.
    async fn expire_sessions(&self, now: DateTime<Utc>) -> AppResult<Vec<CallSession>>;
}

/// Persistence of notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Insert a notification.
    async fn insert_notification(&self, notification: &Notification) -> AppResult<Notification>;

    /// List notifications newest first.
    async fn list_notifications(
        &self,
        filter: &NotificationFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<Notification>>;

    /// Unread notifications for the recipient, optionally of one type.
    async fn count_unread(
        &self,
        recipient_id: &UserId,
        kind: Option<NotificationType>,
    ) -> AppResult<u64>;

    /// Mark one notification read. Keeps the first read timestamp. `None`
    /// when the notification does not exist or belongs to someone else.
    async fn mark_read(
        &self,
        id: &NotificationId,
        recipient_id: &UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Notification>>;

    /// Mark every unread notification of the recipient read.
    async fn mark_all_read(&self, recipient_id: &UserId, now: DateTime<Utc>) -> AppResult<u64>;

    /// Delete one notification owned by the recipient.
    async fn delete_notification(
        &self,
        id: &NotificationId,
        recipient_id: &UserId,
    ) -> AppResult<bool>;

    /// Record that a live socket received the notification.
    async fn mark_delivered_in_app(&self, id: &NotificationId) -> AppResult<()>;

    /// Delete notifications past their purge instant.
    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Everything the application needs from one backing store.
#[async_trait]
pub trait CallStore: UserDirectory + RequestStore + SessionStore + NotificationStore {
    /// Check that the backing store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
