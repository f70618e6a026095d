//! Notification type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// Somebody asked for a call.
    VideoRequest,
    /// A call request was accepted and the call is ready.
    VideoRequestAccepted,
    /// A call request was declined.
    VideoRequestDeclined,
    /// A call request was given a time.
    VideoRequestScheduled,
    /// A scheduled call starts shortly.
    VideoSessionStarting,
    /// Reminder about an upcoming call.
    VideoSessionReminder,
    /// A chat message arrived.
    MessageReceived,
    /// Somebody invited the user directly into a session.
    SkillExchangeRequest,
    /// Platform-wide announcement.
    SystemAnnouncement,
    /// Somebody looked at the user's profile.
    ProfileView,
    /// Somebody rated the user.
    RatingReceived,
}

impl NotificationType {
    /// Return the type as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VideoRequest => "video_request",
            Self::VideoRequestAccepted => "video_request_accepted",
            Self::VideoRequestDeclined => "video_request_declined",
            Self::VideoRequestScheduled => "video_request_scheduled",
            Self::VideoSessionStarting => "video_session_starting",
            Self::VideoSessionReminder => "video_session_reminder",
            Self::MessageReceived => "message_received",
            Self::SkillExchangeRequest => "skill_exchange_request",
            Self::SystemAnnouncement => "system_announcement",
            Self::ProfileView => "profile_view",
            Self::RatingReceived => "rating_received",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown notification type '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_matches_as_str() {
        let kind: NotificationType = "video_request_accepted".parse().expect("parse");
        assert_eq!(kind, NotificationType::VideoRequestAccepted);
        assert_eq!(kind.as_str(), "video_request_accepted");
        assert!("video_call".parse::<NotificationType>().is_err());
    }
}
