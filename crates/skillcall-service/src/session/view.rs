//! Read model for sessions.

use chrono::{DateTime, Utc};
use serde::Serialize;

use skillcall_entity::session::CallSession;

/// A session as returned to callers, with forced expiry applied and the
/// derived timings filled in.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: CallSession,
    /// Seconds left while active, zero otherwise.
    pub remaining_seconds: i64,
    /// Whole minutes between start and end once finished.
    pub actual_duration_minutes: Option<i64>,
}

impl SessionView {
    pub fn at(session: CallSession, now: DateTime<Utc>) -> Self {
        let session = session.with_effective_status(now);
        Self {
            remaining_seconds: session.remaining_seconds(now),
            actual_duration_minutes: session.actual_duration_minutes(),
            session,
        }
    }
}
