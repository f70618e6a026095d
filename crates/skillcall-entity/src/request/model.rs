//! Call request entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use skillcall_core::types::Priority;
use skillcall_core::types::id::{RequestId, SessionId, UserId};

use super::status::RequestStatus;

/// A proposal by one user for a call with another.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CallRequest {
    /// Unique request identifier.
    pub id: RequestId,
    /// The user asking for the call.
    pub requester_id: UserId,
    /// The user being asked.
    pub recipient_id: UserId,
    /// Subject of the call.
    pub topic: String,
    /// Free-text description.
    pub description: String,
    /// Skill the requester offers to teach.
    pub skill_to_teach: Option<String>,
    /// Skill the requester wants to learn.
    pub skill_to_learn: Option<String>,
    /// Urgency chosen by the requester.
    pub priority: Priority,
    /// Current status.
    pub status: RequestStatus,
    /// Time the requester would prefer.
    pub preferred_time: Option<DateTime<Utc>>,
    /// Time agreed by the recipient (accept or schedule).
    pub scheduled_time: Option<DateTime<Utc>>,
    /// Requested call length in minutes.
    pub requested_duration_minutes: i32,
    /// Message attached to the recipient's response.
    pub response_message: Option<String>,
    /// Session opened by accepting this request.
    pub session_id: Option<SessionId>,
    /// When the starting-soon reminder went out.
    pub reminder_sent_at: Option<DateTime<Utc>>,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When the request was last modified.
    pub updated_at: DateTime<Utc>,
    /// When the recipient responded.
    pub responded_at: Option<DateTime<Utc>>,
    /// After this instant a pending request is no longer actionable.
    pub expires_at: DateTime<Utc>,
}

/// Input for proposing a call.
#[derive(Debug, Clone)]
pub struct NewCallRequest {
    /// The user asking for the call.
    pub requester_id: UserId,
    /// The user being asked.
    pub recipient_id: UserId,
    /// Subject of the call.
    pub topic: String,
    /// Free-text description.
    pub description: String,
    /// Skill the requester offers to teach.
    pub skill_to_teach: Option<String>,
    /// Skill the requester wants to learn.
    pub skill_to_learn: Option<String>,
    /// Urgency chosen by the requester.
    pub priority: Priority,
    /// Time the requester would prefer.
    pub preferred_time: Option<DateTime<Utc>>,
    /// Requested call length in minutes.
    pub requested_duration_minutes: i32,
}

impl CallRequest {
    /// Build a fresh pending request that expires `ttl` after `now`.
    pub fn propose(input: NewCallRequest, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: RequestId::generate(),
            requester_id: input.requester_id,
            recipient_id: input.recipient_id,
            topic: input.topic,
            description: input.description,
            skill_to_teach: input.skill_to_teach,
            skill_to_learn: input.skill_to_learn,
            priority: input.priority,
            status: RequestStatus::Pending,
            preferred_time: input.preferred_time,
            scheduled_time: None,
            requested_duration_minutes: input.requested_duration_minutes,
            response_message: None,
            session_id: None,
            reminder_sent_at: None,
            created_at: now,
            updated_at: now,
            responded_at: None,
            expires_at: now + ttl,
        }
    }

    /// Pending and past its expiry instant.
    pub fn is_lapsed(&self, now: DateTime<Utc>) -> bool {
        self.status == RequestStatus::Pending && now > self.expires_at
    }

    /// Status as readers must see it, with lapsed requests reported expired
    /// even before the sweep rewrites them.
    pub fn effective_status(&self, now: DateTime<Utc>) -> RequestStatus {
        if self.is_lapsed(now) {
            RequestStatus::Expired
        } else {
            self.status
        }
    }

    /// Whether the recipient can still respond.
    pub fn is_actionable(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == RequestStatus::Pending
    }

    /// Whether the user is requester or recipient.
    pub fn involves(&self, user_id: &UserId) -> bool {
        &self.requester_id == user_id || &self.recipient_id == user_id
    }

    /// Copy with the lazily computed status applied.
    pub fn with_effective_status(mut self, now: DateTime<Utc>) -> Self {
        self.status = self.effective_status(now);
        self
    }
}

/// Which side of the requests to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestDirection {
    /// Requests the caller sent.
    Sent,
    /// Requests the caller received.
    Received,
    /// Both.
    #[default]
    All,
}

/// Filter for listing requests on behalf of one user.
#[derive(Debug, Clone)]
pub struct RequestFilter {
    /// The user whose requests are listed.
    pub user_id: UserId,
    /// Which side.
    pub direction: RequestDirection,
    /// Optional status filter, compared against the effective status.
    pub status: Option<RequestStatus>,
    /// Instant at which lapsed pending requests count as expired.
    pub now: DateTime<Utc>,
}

impl RequestFilter {
    /// Whether a request belongs in this listing.
    pub fn matches(&self, request: &CallRequest) -> bool {
        let side = match self.direction {
            RequestDirection::Sent => request.requester_id == self.user_id,
            RequestDirection::Received => request.recipient_id == self.user_id,
            RequestDirection::All => request.involves(&self.user_id),
        };
        side && self.status.is_none_or(|s| s == request.effective_status(self.now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(now: DateTime<Utc>) -> CallRequest {
        CallRequest::propose(
            NewCallRequest {
                requester_id: UserId::from("u1"),
                recipient_id: UserId::from("u2"),
                topic: "React hooks".to_string(),
                description: String::new(),
                skill_to_teach: None,
                skill_to_learn: Some("react".to_string()),
                priority: Priority::Medium,
                preferred_time: None,
                requested_duration_minutes: 10,
            },
            now,
            Duration::days(7),
        )
    }

    #[test]
    fn test_propose_sets_expiry() {
        let now = Utc::now();
        let req = sample(now);
        assert_eq!(req.status, RequestStatus::Pending);
        assert_eq!(req.expires_at, now + Duration::days(7));
        assert!(req.id.as_str().starts_with("req_"));
    }

    #[test]
    fn test_lazy_expiry() {
        let now = Utc::now();
        let req = sample(now);
        assert!(req.is_actionable(now + Duration::days(7)));
        let later = now + Duration::days(7) + Duration::seconds(1);
        assert_eq!(req.effective_status(later), RequestStatus::Expired);
        assert!(!req.is_actionable(later));
    }

    #[test]
    fn test_terminal_requests_never_lapse() {
        let now = Utc::now();
        let mut req = sample(now);
        req.status = RequestStatus::Declined;
        let later = now + Duration::days(30);
        assert_eq!(req.effective_status(later), RequestStatus::Declined);
    }

    #[test]
    fn test_filter_direction() {
        let req = sample(Utc::now());
        let sent = RequestFilter {
            user_id: UserId::from("u1"),
            direction: RequestDirection::Sent,
            status: None,
            now: Utc::now(),
        };
        let received = RequestFilter {
            user_id: UserId::from("u1"),
            direction: RequestDirection::Received,
            status: None,
            now: Utc::now(),
        };
        assert!(sent.matches(&req));
        assert!(!received.matches(&req));
    }

    #[test]
    fn test_filter_status_sees_lapsed_as_expired() {
        let now = Utc::now();
        let req = sample(now);
        let filter = |status, at| RequestFilter {
            user_id: UserId::from("u2"),
            direction: RequestDirection::Received,
            status: Some(status),
            now: at,
        };

        assert!(filter(RequestStatus::Pending, now).matches(&req));
        assert!(!filter(RequestStatus::Expired, now).matches(&req));

        let later = now + Duration::days(8);
        assert!(!filter(RequestStatus::Pending, later).matches(&req));
        assert!(filter(RequestStatus::Expired, later).matches(&req));
    }
}
