//! Call-session domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{SessionId, UserId};

/// Session transitions that are broadcast to participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A session was created directly and awaits the participant.
    Invited {
        /// The new session.
        session_id: SessionId,
        /// Who created it.
        initiator_id: UserId,
        /// Display name of the initiator.
        initiator_name: String,
        /// Who was invited.
        participant_id: UserId,
        /// Topic of the call.
        topic: String,
    },
    /// The session became active.
    Started {
        /// The session.
        session_id: SessionId,
        /// Who started it.
        started_by: UserId,
        /// When the clock started.
        started_at: DateTime<Utc>,
    },
    /// A party ended the call.
    Ended {
        /// The session.
        session_id: SessionId,
        /// Who ended it.
        ended_by: UserId,
        /// When it ended.
        ended_at: DateTime<Utc>,
    },
    /// A pending session was cancelled or its invitation declined.
    Cancelled {
        /// The session.
        session_id: SessionId,
        /// Who cancelled it.
        cancelled_by: UserId,
    },
    /// The duration cap was reached and the sweep closed the session.
    Expired {
        /// The session.
        session_id: SessionId,
        /// Start plus duration cap.
        ended_at: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// The session this event belongs to.
    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::Invited { session_id, .. }
            | Self::Started { session_id, .. }
            | Self::Ended { session_id, .. }
            | Self::Cancelled { session_id, .. }
            | Self::Expired { session_id, .. } => session_id,
        }
    }
}
