//! Call-request domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Priority;
use crate::types::id::{RequestId, SessionId, UserId};

/// Transitions of a call request that somebody must hear about.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RequestEvent {
    /// A requester proposed a call.
    Created {
        /// The new request.
        request_id: RequestId,
        /// Who asked.
        requester_id: UserId,
        /// Display name of the requester.
        requester_name: String,
        /// Who was asked.
        recipient_id: UserId,
        /// Proposed topic.
        topic: String,
        /// Urgency chosen by the requester.
        priority: Priority,
    },
    /// The recipient accepted and a live session was opened.
    Accepted {
        /// The accepted request.
        request_id: RequestId,
        /// The session created by the acceptance.
        session_id: SessionId,
        /// Who asked.
        requester_id: UserId,
        /// Who accepted.
        recipient_id: UserId,
        /// Display name of the recipient.
        recipient_name: String,
        /// Duration cap of the new session, in minutes.
        call_duration_minutes: i32,
    },
    /// The recipient declined.
    Declined {
        /// The declined request.
        request_id: RequestId,
        /// Who asked.
        requester_id: UserId,
        /// Who declined.
        recipient_id: UserId,
        /// Display name of the recipient.
        recipient_name: String,
    },
    /// The recipient proposed a concrete time.
    Scheduled {
        /// The scheduled request.
        request_id: RequestId,
        /// Who asked.
        requester_id: UserId,
        /// Who scheduled.
        recipient_id: UserId,
        /// Display name of the recipient.
        recipient_name: String,
        /// Agreed start.
        scheduled_time: DateTime<Utc>,
    },
    /// A scheduled call is about to begin.
    StartingSoon {
        /// The scheduled request.
        request_id: RequestId,
        /// Who asked.
        requester_id: UserId,
        /// Who scheduled.
        recipient_id: UserId,
        /// Topic of the call.
        topic: String,
        /// Agreed start.
        scheduled_time: DateTime<Utc>,
    },
}
