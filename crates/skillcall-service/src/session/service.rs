//! Session lifecycle manager.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use skillcall_auth::access::{SessionAction, can_act};
use skillcall_auth::room::{RoomGrantRequest, RoomTokenIssuer};
use skillcall_core::config::call::CallConfig;
use skillcall_core::error::AppError;
use skillcall_core::events::{DomainEvent, SessionEvent};
use skillcall_core::result::AppResult;
use skillcall_core::traits::EventPublisher;
use skillcall_core::types::id::{SessionId, UserId};
use skillcall_core::types::pagination::{PageRequest, PageResponse};
use skillcall_database::{CallStore, SessionTransition};
use skillcall_entity::session::{CallSession, NewCallSession, SessionOrigin, SessionStatus};

use super::room::{RoomAccess, RoomInfo};
use super::view::SessionView;
use crate::context::RequestContext;

const DEFAULT_TOPIC: &str = "Skill Exchange Session";
const MAX_FEEDBACK_LEN: usize = 1000;

/// Input for a direct (ad-hoc) session invitation.
#[derive(Debug, Clone)]
pub struct CreateSessionInput {
    pub participant_id: UserId,
    pub topic: Option<String>,
    pub description: Option<String>,
    pub skill_to_teach: Option<String>,
    pub skill_to_learn: Option<String>,
}

/// Everything needed to open a session, whatever its origin.
#[derive(Debug, Clone)]
pub struct SessionDraft {
    pub initiator_id: UserId,
    pub participant_id: UserId,
    pub topic: String,
    pub description: String,
    pub skill_to_teach: Option<String>,
    pub skill_to_learn: Option<String>,
    /// Start instant for request-spawned sessions.
    pub start_time: Option<DateTime<Utc>>,
}

/// Drives sessions through `pending → active → completed`, with
/// `pending → cancelled` and `active → expired` as the other exits.
pub struct SessionLifecycleManager {
    store: Arc<dyn CallStore>,
    events: Arc<dyn EventPublisher>,
    issuer: Arc<dyn RoomTokenIssuer>,
    config: CallConfig,
}

impl std::fmt::Debug for SessionLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLifecycleManager")
            .field("config", &self.config)
            .finish()
    }
}

impl SessionLifecycleManager {
    /// Creates a new session lifecycle manager.
    pub fn new(
        store: Arc<dyn CallStore>,
        events: Arc<dyn EventPublisher>,
        issuer: Arc<dyn RoomTokenIssuer>,
        config: CallConfig,
    ) -> Self {
        Self {
            store,
            events,
            issuer,
            config,
        }
    }

    /// Build the session record for `origin`.
    ///
    /// This is the only place sessions are constructed; request acceptance
    /// uses it with [`SessionOrigin::FromRequest`] and hands the record to
    /// the store together with the request update.
    pub fn draft(
        &self,
        draft: SessionDraft,
        origin: SessionOrigin,
        now: DateTime<Utc>,
    ) -> AppResult<CallSession> {
        if draft.initiator_id == draft.participant_id {
            return Err(AppError::validation(
                "Cannot start a session with yourself",
            ));
        }
        Ok(CallSession::open(
            NewCallSession {
                initiator_id: draft.initiator_id,
                participant_id: draft.participant_id,
                topic: draft.topic,
                description: draft.description,
                skill_to_teach: draft.skill_to_teach,
                skill_to_learn: draft.skill_to_learn,
                origin,
                start_time: draft.start_time,
                duration_cap_minutes: self.config.session_duration_minutes,
            },
            now,
        ))
    }

    /// Invite another user to a call. The session starts pending and the
    /// participant is told about it.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateSessionInput,
    ) -> AppResult<SessionView> {
        if input.participant_id.as_str().trim().is_empty() {
            return Err(AppError::validation("participant_id is required"));
        }
        if self.store.find_user(&input.participant_id).await?.is_none() {
            return Err(AppError::not_found("Participant not found"));
        }

        let now = Utc::now();
        let session = self.draft(
            SessionDraft {
                initiator_id: ctx.user_id.clone(),
                participant_id: input.participant_id,
                topic: non_blank(input.topic).unwrap_or_else(|| DEFAULT_TOPIC.to_string()),
                description: input.description.unwrap_or_default(),
                skill_to_teach: non_blank(input.skill_to_teach),
                skill_to_learn: non_blank(input.skill_to_learn),
                start_time: None,
            },
            SessionOrigin::Direct,
            now,
        )?;
        let session = self.store.insert_session(&session).await?;

        info!(
            session_id = %session.id,
            initiator_id = %session.initiator_id,
            participant_id = %session.participant_id,
            "Session invitation created"
        );

        self.events
            .publish(DomainEvent::session(
                Some(ctx.user_id.clone()),
                SessionEvent::Invited {
                    session_id: session.id.clone(),
                    initiator_id: session.initiator_id.clone(),
                    initiator_name: ctx.display_name.clone(),
                    participant_id: session.participant_id.clone(),
                    topic: session.topic.clone(),
                },
            ))
            .await;

        Ok(SessionView::at(session, now))
    }

    /// Get a session the caller is party to.
    pub async fn get(&self, ctx: &RequestContext, id: &SessionId) -> AppResult<SessionView> {
        let session = self.load(id).await?;
        can_act(&ctx.user_id, &session, SessionAction::Read)
            .or_else(|| AppError::forbidden("You are not a participant in this session"))?;
        Ok(SessionView::at(session, Utc::now()))
    }

    /// Sessions the caller is party to, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        status: Option<SessionStatus>,
        page: PageRequest,
    ) -> AppResult<PageResponse<SessionView>> {
        let now = Utc::now();
        let page = self.store.list_sessions(&ctx.user_id, status, page).await?;
        Ok(page.map(|session| SessionView::at(session, now)))
    }

    /// Move a pending session to active.
    pub async fn start(&self, ctx: &RequestContext, id: &SessionId) -> AppResult<SessionView> {
        let session = self.load(id).await?;
        can_act(&ctx.user_id, &session, SessionAction::Advance)
            .or_else(|| AppError::not_found("Session not found"))?;
        self.activate(ctx, &session).await
    }

    /// Participant accepts a direct invitation; the call starts now.
    pub async fn accept_invitation(
        &self,
        ctx: &RequestContext,
        id: &SessionId,
    ) -> AppResult<SessionView> {
        let session = self.load(id).await?;
        can_act(&ctx.user_id, &session, SessionAction::RespondToInvitation)
            .or_else(|| AppError::not_found("Session invitation not found"))?;
        self.activate(ctx, &session).await
    }

    /// Participant declines a direct invitation.
    pub async fn decline_invitation(
        &self,
        ctx: &RequestContext,
        id: &SessionId,
    ) -> AppResult<SessionView> {
        let session = self.load(id).await?;
        can_act(&ctx.user_id, &session, SessionAction::RespondToInvitation)
            .or_else(|| AppError::not_found("Session invitation not found"))?;
        self.close_pending(ctx, &session).await
    }

    /// Initiator withdraws a pending session.
    pub async fn cancel(&self, ctx: &RequestContext, id: &SessionId) -> AppResult<SessionView> {
        let session = self.load(id).await?;
        can_act(&ctx.user_id, &session, SessionAction::Cancel)
            .or_else(|| AppError::not_found("Session not found"))?;
        self.close_pending(ctx, &session).await
    }

    /// Finish an active call and tell every connected client to hang up.
    pub async fn end(&self, ctx: &RequestContext, id: &SessionId) -> AppResult<SessionView> {
        let session = self.load(id).await?;
        can_act(&ctx.user_id, &session, SessionAction::Advance)
            .or_else(|| AppError::not_found("Session not found"))?;

        let now = Utc::now();
        if session.is_overdue(now) {
            self.expire_overdue().await?;
            return Err(AppError::not_found("Session not active"));
        }

        let ended = self
            .store
            .transition_session(id, SessionTransition::Complete, now)
            .await?
            .ok_or_else(|| AppError::not_found("Session not active"))?;

        info!(
            session_id = %id,
            user_id = %ctx.user_id,
            duration_minutes = ?ended.actual_duration_minutes(),
            "Session ended"
        );

        self.events
            .publish(DomainEvent::session(
                Some(ctx.user_id.clone()),
                SessionEvent::Ended {
                    session_id: ended.id.clone(),
                    ended_by: ctx.user_id.clone(),
                    ended_at: ended.end_time.unwrap_or(now),
                },
            ))
            .await;

        Ok(SessionView::at(ended, now))
    }

    /// Rate a completed call. A second submission from the same side
    /// replaces the first.
    pub async fn submit_feedback(
        &self,
        ctx: &RequestContext,
        id: &SessionId,
        rating: i16,
        feedback: Option<String>,
    ) -> AppResult<SessionView> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::validation("Rating must be between 1 and 5"));
        }
        if feedback
            .as_deref()
            .is_some_and(|text| text.chars().count() > MAX_FEEDBACK_LEN)
        {
            return Err(AppError::validation(
                "Feedback must be at most 1000 characters",
            ));
        }

        let session = self.load(id).await?;
        can_act(&ctx.user_id, &session, SessionAction::Feedback)
            .or_else(|| AppError::not_found("Session not found"))?;
        let side = session
            .side_of(&ctx.user_id)
            .ok_or_else(|| AppError::not_found("Session not found"))?;

        let now = Utc::now();
        if session.effective_status(now) != SessionStatus::Completed {
            return Err(AppError::not_found("Session not completed"));
        }

        let updated = self
            .store
            .save_feedback(id, side, rating, non_blank(feedback), now)
            .await?
            .ok_or_else(|| AppError::not_found("Session not completed"))?;

        info!(session_id = %id, user_id = %ctx.user_id, rating, "Feedback recorded");
        Ok(SessionView::at(updated, now))
    }

    /// Mint a media-room credential for a party of an active session.
    ///
    /// The room name is fixed on the first call and reused afterwards.
    pub async fn issue_room_token(
        &self,
        ctx: &RequestContext,
        id: &SessionId,
    ) -> AppResult<RoomAccess> {
        let session = self.load(id).await?;
        can_act(&ctx.user_id, &session, SessionAction::Join)
            .or_else(|| AppError::forbidden("You are not a participant in this session"))?;

        let now = Utc::now();
        if session.effective_status(now) != SessionStatus::Active {
            if session.is_overdue(now) {
                self.expire_overdue().await?;
            }
            return Err(AppError::not_found("session not active"));
        }

        let candidate = format!("session-{}-{}", session.id, now.timestamp_millis());
        let session = self
            .store
            .assign_room(id, &candidate, now)
            .await?
            .ok_or_else(|| AppError::not_found("Session not found"))?;
        let room_name = session
            .room_name
            .clone()
            .ok_or_else(|| AppError::internal("Room name was not stored"))?;

        let remaining = session.remaining_seconds(now);
        let issued = self.issuer.issue(&RoomGrantRequest {
            room_name,
            identity: ctx.user_id.clone(),
            display_name: ctx.display_name.clone(),
            remaining_seconds: remaining,
        })?;

        debug!(
            session_id = %id,
            user_id = %ctx.user_id,
            room = %issued.room_name,
            remaining_seconds = remaining,
            "Room token issued"
        );

        Ok(RoomAccess {
            token: issued.token,
            room_name: issued.room_name,
            ws_url: issued.ws_url,
            remaining_duration: remaining,
            expires_at: issued.expires_at,
        })
    }

    /// Room details without issuing a credential.
    pub async fn room_info(&self, ctx: &RequestContext, id: &SessionId) -> AppResult<RoomInfo> {
        let session = self.load(id).await?;
        can_act(&ctx.user_id, &session, SessionAction::Read)
            .or_else(|| AppError::forbidden("You are not a participant in this session"))?;

        let now = Utc::now();
        Ok(RoomInfo {
            session_id: session.id.clone(),
            status: session.effective_status(now),
            room_name: session.room_name.clone(),
            ws_url: self.issuer.ws_url().to_string(),
            call_duration_minutes: session.duration_cap_minutes,
            remaining_seconds: session.remaining_seconds(now),
            call_started_at: session.call_started_at,
        })
    }

    /// Rewrite overdue active sessions to expired and announce each one.
    pub async fn expire_overdue(&self) -> AppResult<usize> {
        let now = Utc::now();
        let expired = self.store.expire_sessions(now).await?;
        for session in &expired {
            info!(session_id = %session.id, "Session reached its duration cap");
            self.events
                .publish(DomainEvent::session(
                    None,
                    SessionEvent::Expired {
                        session_id: session.id.clone(),
                        ended_at: session.end_time.unwrap_or(now),
                    },
                ))
                .await;
        }
        Ok(expired.len())
    }

    async fn load(&self, id: &SessionId) -> AppResult<CallSession> {
        self.store
            .find_session(id)
            .await?
            .ok_or_else(|| AppError::not_found("Session not found"))
    }

    async fn activate(&self, ctx: &RequestContext, session: &CallSession) -> AppResult<SessionView> {
        let now = Utc::now();
        let started = self
            .store
            .transition_session(&session.id, SessionTransition::Start, now)
            .await?
            .ok_or_else(|| AppError::not_found("Session cannot be started"))?;

        info!(session_id = %started.id, user_id = %ctx.user_id, "Session started");

        self.events
            .publish(DomainEvent::session(
                Some(ctx.user_id.clone()),
                SessionEvent::Started {
                    session_id: started.id.clone(),
                    started_by: ctx.user_id.clone(),
                    started_at: started.start_time.unwrap_or(now),
                },
            ))
            .await;

        Ok(SessionView::at(started, now))
    }

    async fn close_pending(
        &self,
        ctx: &RequestContext,
        session: &CallSession,
    ) -> AppResult<SessionView> {
        let now = Utc::now();
        let cancelled = self
            .store
            .transition_session(&session.id, SessionTransition::Cancel, now)
            .await?
            .ok_or_else(|| AppError::not_found("Session cannot be cancelled"))?;

        info!(session_id = %cancelled.id, user_id = %ctx.user_id, "Session cancelled");

        self.events
            .publish(DomainEvent::session(
                Some(ctx.user_id.clone()),
                SessionEvent::Cancelled {
                    session_id: cancelled.id.clone(),
                    cancelled_by: ctx.user_id.clone(),
                },
            ))
            .await;
        Ok(SessionView::at(cancelled, now))
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
