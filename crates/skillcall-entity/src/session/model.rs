//! Call session entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use skillcall_core::types::id::{RequestId, SessionId, UserId, generate_token};

use super::status::SessionStatus;

/// A live or finished call between two users.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CallSession {
    /// Unique session identifier.
    pub id: SessionId,
    /// The user who opened the session (the requester, for accepted requests).
    pub initiator_id: UserId,
    /// The other named party.
    pub participant_id: UserId,
    /// Everybody allowed into the call, named parties included.
    pub roster: Vec<UserId>,
    /// Request this session was spawned from, if any.
    pub request_id: Option<RequestId>,
    /// Current stored status.
    pub status: SessionStatus,
    /// Subject of the call.
    pub topic: String,
    /// Free-text description.
    pub description: String,
    /// Skill being taught.
    pub skill_to_teach: Option<String>,
    /// Skill being learned.
    pub skill_to_learn: Option<String>,
    /// Set on the transition into active.
    pub start_time: Option<DateTime<Utc>>,
    /// Set on the transition into completed or expired.
    pub end_time: Option<DateTime<Utc>>,
    /// Duration cap fixed at creation.
    pub duration_cap_minutes: i32,
    /// Opaque room credential placeholder.
    pub room_token: String,
    /// Media room name, assigned on first token request.
    pub room_name: Option<String>,
    /// When the media room was first opened.
    pub call_started_at: Option<DateTime<Utc>>,
    /// Rating given by the initiator (1-5).
    pub initiator_rating: Option<i16>,
    /// Feedback text from the initiator.
    pub initiator_feedback: Option<String>,
    /// Rating given by the participant (1-5).
    pub participant_rating: Option<i16>,
    /// Feedback text from the participant.
    pub participant_feedback: Option<String>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last modified.
    pub updated_at: DateTime<Utc>,
}

/// How a session came to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOrigin {
    /// Ad-hoc invitation; starts pending.
    Direct,
    /// Spawned by accepting a request; starts active.
    FromRequest(RequestId),
}

/// Input for opening a session.
#[derive(Debug, Clone)]
pub struct NewCallSession {
    /// Who opens it.
    pub initiator_id: UserId,
    /// The other named party.
    pub participant_id: UserId,
    /// Subject of the call.
    pub topic: String,
    /// Free-text description.
    pub description: String,
    /// Skill being taught.
    pub skill_to_teach: Option<String>,
    /// Skill being learned.
    pub skill_to_learn: Option<String>,
    /// Where the session comes from.
    pub origin: SessionOrigin,
    /// Start instant for request-spawned sessions; `now` when absent.
    pub start_time: Option<DateTime<Utc>>,
    /// Duration cap in minutes.
    pub duration_cap_minutes: i32,
}

/// Which named side of a session a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartySide {
    /// The initiator.
    Initiator,
    /// The named participant.
    Participant,
}

impl CallSession {
    /// Build a new session record from its origin.
    pub fn open(input: NewCallSession, now: DateTime<Utc>) -> Self {
        let (status, start_time, request_id) = match input.origin {
            SessionOrigin::Direct => (SessionStatus::Pending, None, None),
            SessionOrigin::FromRequest(request_id) => (
                SessionStatus::Active,
                Some(input.start_time.unwrap_or(now)),
                Some(request_id),
            ),
        };
        let roster = vec![input.initiator_id.clone(), input.participant_id.clone()];
        Self {
            id: SessionId::generate(),
            initiator_id: input.initiator_id,
            participant_id: input.participant_id,
            roster,
            request_id,
            status,
            topic: input.topic,
            description: input.description,
            skill_to_teach: input.skill_to_teach,
            skill_to_learn: input.skill_to_learn,
            start_time,
            end_time: None,
            duration_cap_minutes: input.duration_cap_minutes,
            room_token: generate_token("room"),
            room_name: None,
            call_started_at: None,
            initiator_rating: None,
            initiator_feedback: None,
            participant_rating: None,
            participant_feedback: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Where this session came from.
    pub fn origin(&self) -> SessionOrigin {
        match &self.request_id {
            Some(request_id) => SessionOrigin::FromRequest(request_id.clone()),
            None => SessionOrigin::Direct,
        }
    }

    /// Duration cap as a `chrono::Duration`.
    pub fn duration_cap(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_cap_minutes))
    }

    /// Initiator, named participant, or roster member.
    pub fn is_party(&self, user_id: &UserId) -> bool {
        &self.initiator_id == user_id
            || &self.participant_id == user_id
            || self.roster.iter().any(|member| member == user_id)
    }

    /// Which named side the user is on.
    pub fn side_of(&self, user_id: &UserId) -> Option<PartySide> {
        if &self.initiator_id == user_id {
            Some(PartySide::Initiator)
        } else if &self.participant_id == user_id {
            Some(PartySide::Participant)
        } else {
            None
        }
    }

    /// The named party on the other side of `user_id`.
    pub fn counterpart_of(&self, user_id: &UserId) -> &UserId {
        if &self.initiator_id == user_id {
            &self.participant_id
        } else {
            &self.initiator_id
        }
    }

    /// Seconds since the session became active, zero before start.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        self.start_time
            .map(|start| (now - start).num_seconds().max(0))
            .unwrap_or(0)
    }

    /// Active and at or beyond the duration cap.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Active
            && self.elapsed_seconds(now) >= self.duration_cap().num_seconds()
    }

    /// Status as readers must see it. An overdue active session is reported
    /// expired even before the sweep rewrites it.
    pub fn effective_status(&self, now: DateTime<Utc>) -> SessionStatus {
        if self.is_overdue(now) {
            SessionStatus::Expired
        } else {
            self.status
        }
    }

    /// Copy with the lazily computed status applied.
    pub fn with_effective_status(mut self, now: DateTime<Utc>) -> Self {
        if self.is_overdue(now) {
            self.status = SessionStatus::Expired;
            self.end_time = self.forced_end_time();
        }
        self
    }

    /// Start plus duration cap.
    pub fn forced_end_time(&self) -> Option<DateTime<Utc>> {
        self.start_time.map(|start| start + self.duration_cap())
    }

    /// Seconds left on an active call, zero otherwise.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        if self.effective_status(now) != SessionStatus::Active {
            return 0;
        }
        (self.duration_cap().num_seconds() - self.elapsed_seconds(now)).max(0)
    }

    /// Length of a finished call in whole minutes.
    pub fn actual_duration_minutes(&self) -> Option<i64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some((end - start).num_minutes().max(0)),
            _ => None,
        }
    }
}
