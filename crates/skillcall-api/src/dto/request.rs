//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use skillcall_core::types::Priority;
use skillcall_core::types::id::UserId;
use skillcall_service::{CreateRequestInput, CreateSessionInput, RespondInput};

/// Body of `POST /api/video-requests`.
///
/// Only presence is checked here; the lifecycle manager owns the ordering of
/// the remaining checks (unknown recipient before length limits).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateVideoRequestBody {
    /// Who is asked.
    #[serde(default)]
    #[validate(length(min = 1, message = "recipient_id is required"))]
    pub recipient_id: String,
    pub topic: Option<String>,
    pub description: Option<String>,
    pub skill_to_teach: Option<String>,
    pub skill_to_learn: Option<String>,
    pub priority: Option<Priority>,
    pub preferred_time: Option<DateTime<Utc>>,
}

impl From<CreateVideoRequestBody> for CreateRequestInput {
    fn from(body: CreateVideoRequestBody) -> Self {
        Self {
            recipient_id: UserId::from(body.recipient_id),
            topic: body.topic,
            description: body.description,
            skill_to_teach: body.skill_to_teach,
            skill_to_learn: body.skill_to_learn,
            priority: body.priority,
            preferred_time: body.preferred_time,
        }
    }
}

/// Body of the accept, decline and schedule endpoints. May be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RespondBody {
    pub scheduled_time: Option<DateTime<Utc>>,
    #[validate(length(max = 1000, message = "Message must be at most 1000 characters"))]
    pub message: Option<String>,
}

impl From<RespondBody> for RespondInput {
    fn from(body: RespondBody) -> Self {
        Self {
            scheduled_time: body.scheduled_time,
            message: body.message,
        }
    }
}

/// Body of `POST /api/sessions`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSessionBody {
    #[serde(default)]
    #[validate(length(min = 1, message = "participant_id is required"))]
    pub participant_id: String,
    pub topic: Option<String>,
    pub description: Option<String>,
    pub skill_to_teach: Option<String>,
    pub skill_to_learn: Option<String>,
}

impl From<CreateSessionBody> for CreateSessionInput {
    fn from(body: CreateSessionBody) -> Self {
        Self {
            participant_id: UserId::from(body.participant_id),
            topic: body.topic,
            description: body.description,
            skill_to_teach: body.skill_to_teach,
            skill_to_learn: body.skill_to_learn,
        }
    }
}

/// Body of `POST /api/sessions/{id}/feedback`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedbackBody {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
    #[validate(length(max = 1000, message = "Feedback must be at most 1000 characters"))]
    pub feedback: Option<String>,
}
