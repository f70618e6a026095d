//! Request lifecycle manager.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::info;

use skillcall_auth::access::{RequestAction, can_act};
use skillcall_core::config::call::CallConfig;
use skillcall_core::error::AppError;
use skillcall_core::events::{DomainEvent, RequestEvent};
use skillcall_core::result::AppResult;
use skillcall_core::traits::EventPublisher;
use skillcall_core::types::Priority;
use skillcall_core::types::id::{RequestId, UserId};
use skillcall_core::types::pagination::{PageRequest, PageResponse};
use skillcall_database::{CallStore, RequestResponse};
use skillcall_entity::request::{
    CallRequest, NewCallRequest, RequestDirection, RequestFilter, RequestStatus,
};
use skillcall_entity::session::SessionOrigin;

use crate::context::RequestContext;
use crate::session::{SessionDraft, SessionLifecycleManager, SessionView};
use crate::session::service::non_blank;

const DEFAULT_TOPIC: &str = "Skill Exchange Session";
const MAX_TOPIC_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 1000;
const NOT_ACTIONABLE: &str = "Request not found or already processed";

/// Input for proposing a call.
#[derive(Debug, Clone)]
pub struct CreateRequestInput {
    pub recipient_id: UserId,
    pub topic: Option<String>,
    pub description: Option<String>,
    pub skill_to_teach: Option<String>,
    pub skill_to_learn: Option<String>,
    pub priority: Option<Priority>,
    pub preferred_time: Option<DateTime<Utc>>,
}

/// A recipient's response payload.
#[derive(Debug, Clone, Default)]
pub struct RespondInput {
    pub scheduled_time: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

/// Result of accepting a request: both records, written together.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedRequest {
    pub request: CallRequest,
    pub session: SessionView,
}

/// Drives requests through `pending → {accepted, declined, scheduled}` and
/// `pending → expired`.
pub struct RequestLifecycleManager {
    store: Arc<dyn CallStore>,
    events: Arc<dyn EventPublisher>,
    sessions: Arc<SessionLifecycleManager>,
    config: CallConfig,
}

impl std::fmt::Debug for RequestLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLifecycleManager")
            .field("config", &self.config)
            .finish()
    }
}

impl RequestLifecycleManager {
    /// Creates a new request lifecycle manager.
    pub fn new(
        store: Arc<dyn CallStore>,
        events: Arc<dyn EventPublisher>,
        sessions: Arc<SessionLifecycleManager>,
        config: CallConfig,
    ) -> Self {
        Self {
            store,
            events,
            sessions,
            config,
        }
    }

    /// Propose a call to another user.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateRequestInput,
    ) -> AppResult<CallRequest> {
        if input.recipient_id.as_str().trim().is_empty() {
            return Err(AppError::validation("recipient_id is required"));
        }
        if self.store.find_user(&input.recipient_id).await?.is_none() {
            return Err(AppError::not_found("Recipient not found"));
        }
        if input.recipient_id == ctx.user_id {
            return Err(AppError::validation(
                "Cannot send a video request to yourself",
            ));
        }

        let topic = non_blank(input.topic).unwrap_or_else(|| DEFAULT_TOPIC.to_string());
        if topic.chars().count() > MAX_TOPIC_LEN {
            return Err(AppError::validation("Topic must be at most 200 characters"));
        }
        let description = input.description.unwrap_or_default();
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(AppError::validation(
                "Description must be at most 1000 characters",
            ));
        }

        let now = Utc::now();
        let request = CallRequest::propose(
            NewCallRequest {
                requester_id: ctx.user_id.clone(),
                recipient_id: input.recipient_id,
                topic,
                description,
                skill_to_teach: non_blank(input.skill_to_teach),
                skill_to_learn: non_blank(input.skill_to_learn),
                priority: input.priority.unwrap_or_default(),
                preferred_time: input.preferred_time,
                requested_duration_minutes: self.config.requested_duration_minutes,
            },
            now,
            Duration::days(self.config.request_ttl_days),
        );
        let request = self.store.insert_request(&request).await?;

        info!(
            request_id = %request.id,
            requester_id = %request.requester_id,
            recipient_id = %request.recipient_id,
            priority = %request.priority,
            "Video request created"
        );

        self.events
            .publish(DomainEvent::request(
                Some(ctx.user_id.clone()),
                RequestEvent::Created {
                    request_id: request.id.clone(),
                    requester_id: request.requester_id.clone(),
                    requester_name: ctx.display_name.clone(),
                    recipient_id: request.recipient_id.clone(),
                    topic: request.topic.clone(),
                    priority: request.priority,
                },
            ))
            .await;

        Ok(request)
    }

    /// Requests the caller sent, received, or both, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        direction: RequestDirection,
        status: Option<RequestStatus>,
        page: PageRequest,
    ) -> AppResult<PageResponse<CallRequest>> {
        let now = Utc::now();
        let filter = RequestFilter {
            user_id: ctx.user_id.clone(),
            direction,
            status,
            now,
        };
        let page = self.store.list_requests(&filter, page).await?;
        Ok(page.map(|request| request.with_effective_status(now)))
    }

    /// Requests still awaiting the caller's answer.
    pub async fn pending_count(&self, ctx: &RequestContext) -> AppResult<u64> {
        self.store
            .count_actionable_for_recipient(&ctx.user_id, Utc::now())
            .await
    }

    /// Get a request the caller sent or received.
    pub async fn get(&self, ctx: &RequestContext, id: &RequestId) -> AppResult<CallRequest> {
        let request = self
            .store
            .find_request(id)
            .await?
            .ok_or_else(|| AppError::not_found("Request not found"))?;
        can_act(&ctx.user_id, &request, RequestAction::Read)
            .or_else(|| AppError::forbidden("You are not a party to this request"))?;
        Ok(request.with_effective_status(Utc::now()))
    }

    /// Accept a pending request. The request and its new active session are
    /// written as one unit.
    pub async fn accept(
        &self,
        ctx: &RequestContext,
        id: &RequestId,
        input: RespondInput,
    ) -> AppResult<AcceptedRequest> {
        let now = Utc::now();
        let request = self.actionable(ctx, id, now).await?;

        let session = self.sessions.draft(
            SessionDraft {
                initiator_id: request.requester_id.clone(),
                participant_id: request.recipient_id.clone(),
                topic: request.topic.clone(),
                description: request.description.clone(),
                skill_to_teach: request.skill_to_teach.clone(),
                skill_to_learn: request.skill_to_learn.clone(),
                start_time: input.scheduled_time,
            },
            SessionOrigin::FromRequest(request.id.clone()),
            now,
        )?;

        let response = RequestResponse {
            request_id: request.id.clone(),
            recipient_id: ctx.user_id.clone(),
            status: RequestStatus::Accepted,
            scheduled_time: Some(input.scheduled_time.unwrap_or(now)),
            message: non_blank(input.message),
            now,
        };
        let (request, session) = self
            .store
            .accept_request(&response, &session)
            .await?
            .ok_or_else(|| AppError::not_found(NOT_ACTIONABLE))?;

        info!(
            request_id = %request.id,
            session_id = %session.id,
            user_id = %ctx.user_id,
            "Video request accepted"
        );

        self.events
            .publish(DomainEvent::request(
                Some(ctx.user_id.clone()),
                RequestEvent::Accepted {
                    request_id: request.id.clone(),
                    session_id: session.id.clone(),
                    requester_id: request.requester_id.clone(),
                    recipient_id: request.recipient_id.clone(),
                    recipient_name: ctx.display_name.clone(),
                    call_duration_minutes: session.duration_cap_minutes,
                },
            ))
            .await;

        Ok(AcceptedRequest {
            request,
            session: SessionView::at(session, now),
        })
    }

    /// Decline a pending request.
    pub async fn decline(
        &self,
        ctx: &RequestContext,
        id: &RequestId,
        input: RespondInput,
    ) -> AppResult<CallRequest> {
        let now = Utc::now();
        self.actionable(ctx, id, now).await?;

        let request = self
            .store
            .respond_to_request(&RequestResponse {
                request_id: id.clone(),
                recipient_id: ctx.user_id.clone(),
                status: RequestStatus::Declined,
                scheduled_time: None,
                message: non_blank(input.message),
                now,
            })
            .await?
            .ok_or_else(|| AppError::not_found(NOT_ACTIONABLE))?;

        info!(request_id = %request.id, user_id = %ctx.user_id, "Video request declined");

        self.events
            .publish(DomainEvent::request(
                Some(ctx.user_id.clone()),
                RequestEvent::Declined {
                    request_id: request.id.clone(),
                    requester_id: request.requester_id.clone(),
                    recipient_id: request.recipient_id.clone(),
                    recipient_name: ctx.display_name.clone(),
                },
            ))
            .await;

        Ok(request)
    }

    /// Agree on a later time for a pending request.
    pub async fn schedule(
        &self,
        ctx: &RequestContext,
        id: &RequestId,
        input: RespondInput,
    ) -> AppResult<CallRequest> {
        let scheduled_time = input
            .scheduled_time
            .ok_or_else(|| AppError::validation("scheduled_time is required"))?;

        let now = Utc::now();
        self.actionable(ctx, id, now).await?;

        let request = self
            .store
            .respond_to_request(&RequestResponse {
                request_id: id.clone(),
                recipient_id: ctx.user_id.clone(),
                status: RequestStatus::Scheduled,
                scheduled_time: Some(scheduled_time),
                message: non_blank(input.message),
                now,
            })
            .await?
            .ok_or_else(|| AppError::not_found(NOT_ACTIONABLE))?;

        info!(
            request_id = %request.id,
            user_id = %ctx.user_id,
            scheduled_time = %scheduled_time,
            "Video request scheduled"
        );

        self.events
            .publish(DomainEvent::request(
                Some(ctx.user_id.clone()),
                RequestEvent::Scheduled {
                    request_id: request.id.clone(),
                    requester_id: request.requester_id.clone(),
                    recipient_id: request.recipient_id.clone(),
                    recipient_name: ctx.display_name.clone(),
                    scheduled_time,
                },
            ))
            .await;

        Ok(request)
    }

    /// Rewrite lapsed pending requests to expired. No notifications.
    pub async fn expire_lapsed(&self) -> AppResult<u64> {
        let expired = self.store.expire_requests(Utc::now()).await?;
        if expired > 0 {
            info!(count = expired, "Expired lapsed video requests");
        }
        Ok(expired)
    }

    /// Announce scheduled calls that start within the configured lead time.
    /// Each request is announced once.
    pub async fn send_due_reminders(&self) -> AppResult<usize> {
        let now = Utc::now();
        let horizon = now + Duration::minutes(self.config.session_starting_lead_minutes);
        let due = self.store.claim_due_reminders(now, horizon).await?;

        for request in &due {
            let Some(scheduled_time) = request.scheduled_time else {
                continue;
            };
            self.events
                .publish(DomainEvent::request(
                    None,
                    RequestEvent::StartingSoon {
                        request_id: request.id.clone(),
                        requester_id: request.requester_id.clone(),
                        recipient_id: request.recipient_id.clone(),
                        topic: request.topic.clone(),
                        scheduled_time,
                    },
                ))
                .await;
        }
        Ok(due.len())
    }

    /// Load a request the caller may still answer. Missing, foreign, answered
    /// and lapsed requests all read as not found.
    async fn actionable(
        &self,
        ctx: &RequestContext,
        id: &RequestId,
        now: DateTime<Utc>,
    ) -> AppResult<CallRequest> {
        let request = self
            .store
            .find_request(id)
            .await?
            .ok_or_else(|| AppError::not_found(NOT_ACTIONABLE))?;
        can_act(&ctx.user_id, &request, RequestAction::Respond)
            .or_else(|| AppError::not_found(NOT_ACTIONABLE))?;
        if !request.is_actionable(now) {
            return Err(AppError::not_found(NOT_ACTIONABLE));
        }
        Ok(request)
    }
}
