//! Allow/deny decisions for call requests and call sessions.

use skillcall_core::error::AppError;
use skillcall_core::result::AppResult;
use skillcall_core::types::id::UserId;
use skillcall_entity::request::CallRequest;
use skillcall_entity::session::CallSession;

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The actor may proceed.
    Allow,
    /// The actor may not proceed.
    Deny,
}

impl AccessDecision {
    /// Whether the decision allows the action.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Turn a denial into the error produced by `on_deny`.
    pub fn or_else(self, on_deny: impl FnOnce() -> AppError) -> AppResult<()> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny => Err(on_deny()),
        }
    }

    fn from_bool(allowed: bool) -> Self {
        if allowed { Self::Allow } else { Self::Deny }
    }
}

/// Actions on a call request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    /// View the request.
    Read,
    /// Accept, decline, or schedule it.
    Respond,
}

/// Actions on a call session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// View the session or its room info.
    Read,
    /// Obtain a room token.
    Join,
    /// Start or end the call.
    Advance,
    /// Cancel a pending session.
    Cancel,
    /// Accept or decline a direct invitation.
    RespondToInvitation,
    /// Rate the finished call.
    Feedback,
}

/// An entity with an access policy.
pub trait Guarded {
    /// The actions the policy distinguishes.
    type Action: Copy;

    /// Decide whether `actor` may perform `action` on this entity.
    fn decide(&self, actor: &UserId, action: Self::Action) -> AccessDecision;
}

impl Guarded for CallRequest {
    type Action = RequestAction;

    fn decide(&self, actor: &UserId, action: RequestAction) -> AccessDecision {
        let allowed = match action {
            RequestAction::Read => self.involves(actor),
            RequestAction::Respond => &self.recipient_id == actor,
        };
        AccessDecision::from_bool(allowed)
    }
}

impl Guarded for CallSession {
    type Action = SessionAction;

    fn decide(&self, actor: &UserId, action: SessionAction) -> AccessDecision {
        let allowed = match action {
            SessionAction::Read | SessionAction::Join | SessionAction::Advance => {
                self.is_party(actor)
            }
            SessionAction::Feedback => self.side_of(actor).is_some(),
            SessionAction::Cancel => &self.initiator_id == actor,
            SessionAction::RespondToInvitation => &self.participant_id == actor,
        };
        AccessDecision::from_bool(allowed)
    }
}

/// `can_act(actor, entity, action)`.
pub fn can_act<E: Guarded>(actor: &UserId, entity: &E, action: E::Action) -> AccessDecision {
    entity.decide(actor, action)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use skillcall_core::error::ErrorKind;
    use skillcall_core::types::priority::Priority;
    use skillcall_entity::request::NewCallRequest;
    use skillcall_entity::session::{NewCallSession, SessionOrigin};

    use super::*;

    fn request() -> CallRequest {
        CallRequest::propose(
            NewCallRequest {
                requester_id: UserId::from("u1"),
                recipient_id: UserId::from("u2"),
                topic: "React hooks".to_string(),
                description: String::new(),
                skill_to_teach: None,
                skill_to_learn: None,
                priority: Priority::Medium,
                preferred_time: None,
                requested_duration_minutes: 10,
            },
            Utc::now(),
            Duration::days(7),
        )
    }

    fn session() -> CallSession {
        let mut session = CallSession::open(
            NewCallSession {
                initiator_id: UserId::from("u1"),
                participant_id: UserId::from("u2"),
                topic: "React hooks".to_string(),
                description: String::new(),
                skill_to_teach: None,
                skill_to_learn: None,
                origin: SessionOrigin::Direct,
                start_time: None,
                duration_cap_minutes: 15,
            },
            Utc::now(),
        );
        session.roster.push(UserId::from("u3"));
        session
    }

    #[test]
    fn test_request_read_by_either_party() {
        let req = request();
        assert!(can_act(&UserId::from("u1"), &req, RequestAction::Read).is_allowed());
        assert!(can_act(&UserId::from("u2"), &req, RequestAction::Read).is_allowed());
        assert!(!can_act(&UserId::from("u9"), &req, RequestAction::Read).is_allowed());
    }

    #[test]
    fn test_only_recipient_responds() {
        let req = request();
        assert_eq!(
            can_act(&UserId::from("u1"), &req, RequestAction::Respond),
            AccessDecision::Deny
        );
        assert_eq!(
            can_act(&UserId::from("u2"), &req, RequestAction::Respond),
            AccessDecision::Allow
        );
    }

    #[test]
    fn test_roster_member_may_join_but_not_rate() {
        let s = session();
        let guest = UserId::from("u3");
        assert!(can_act(&guest, &s, SessionAction::Join).is_allowed());
        assert!(can_act(&guest, &s, SessionAction::Advance).is_allowed());
        assert!(!can_act(&guest, &s, SessionAction::Feedback).is_allowed());
        assert!(!can_act(&UserId::from("u9"), &s, SessionAction::Read).is_allowed());
    }

    #[test]
    fn test_cancel_and_invitation_sides() {
        let s = session();
        assert!(can_act(&UserId::from("u1"), &s, SessionAction::Cancel).is_allowed());
        assert!(!can_act(&UserId::from("u2"), &s, SessionAction::Cancel).is_allowed());
        assert!(can_act(&UserId::from("u2"), &s, SessionAction::RespondToInvitation).is_allowed());
        assert!(!can_act(&UserId::from("u1"), &s, SessionAction::RespondToInvitation).is_allowed());
    }

    #[test]
    fn test_deny_maps_to_caller_error() {
        let err = AccessDecision::Deny
            .or_else(|| AppError::forbidden("nope"))
            .expect_err("denied");
        assert_eq!(err.kind, ErrorKind::Forbidden);
        assert!(AccessDecision::Allow.or_else(|| AppError::forbidden("nope")).is_ok());
    }
}
