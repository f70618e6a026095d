//! Request status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a call request.
///
/// `Pending` is the only non-terminal state. `Expired` is reached only from
/// `Pending`, either by the sweep or by the on-read check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting the recipient.
    Pending,
    /// Accepted; a session exists.
    Accepted,
    /// Declined by the recipient.
    Declined,
    /// A time was agreed.
    Scheduled,
    /// Nobody answered in time.
    Expired,
}

impl RequestStatus {
    /// Check if no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Scheduled => "scheduled",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "scheduled" => Ok(Self::Scheduled),
            "expired" => Ok(Self::Expired),
            other => Err(format!("unknown request status '{other}'")),
        }
    }
}
