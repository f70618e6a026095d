//! Notification texts for each domain event.

use skillcall_core::events::{RequestEvent, SessionEvent};
use skillcall_core::types::Priority;
use skillcall_entity::notification::{NotificationData, NotificationType};

use super::dispatcher::NotificationDraft;

/// Notifications caused by a request event.
pub fn for_request_event(event: &RequestEvent) -> Vec<NotificationDraft> {
    match event {
        RequestEvent::Created {
            request_id,
            requester_id,
            requester_name,
            recipient_id,
            topic,
            priority,
        } => vec![NotificationDraft {
            recipient_id: recipient_id.clone(),
            sender_id: Some(requester_id.clone()),
            kind: NotificationType::VideoRequest,
            title: "New Video Session Request".to_string(),
            message: format!("{requester_name} wants to start a video session about \"{topic}\""),
            data: NotificationData {
                video_request_id: Some(request_id.clone()),
                url: Some(format!("/video/requests/{request_id}")),
                ..NotificationData::default()
            },
            priority: *priority,
        }],
        RequestEvent::Accepted {
            request_id,
            session_id,
            requester_id,
            recipient_id,
            recipient_name,
            call_duration_minutes,
        } => vec![NotificationDraft {
            recipient_id: requester_id.clone(),
            sender_id: Some(recipient_id.clone()),
            kind: NotificationType::VideoRequestAccepted,
            title: format!("Video Call Ready - {call_duration_minutes} Minutes"),
            message: format!(
                "{recipient_name} accepted your video session request! Click to join the \
                 {call_duration_minutes}-minute video call."
            ),
            data: NotificationData {
                video_request_id: Some(request_id.clone()),
                video_session_id: Some(session_id.clone()),
                url: Some(format!("/video/session/{session_id}")),
                call_duration: Some(*call_duration_minutes),
                ..NotificationData::default()
            },
            priority: Priority::High,
        }],
        RequestEvent::Declined {
            request_id,
            requester_id,
            recipient_id,
            recipient_name,
        } => vec![NotificationDraft {
            recipient_id: requester_id.clone(),
            sender_id: Some(recipient_id.clone()),
            kind: NotificationType::VideoRequestDeclined,
            title: "Video Request Declined".to_string(),
            message: format!("{recipient_name} declined your video session request"),
            data: NotificationData {
                video_request_id: Some(request_id.clone()),
                ..NotificationData::default()
            },
            priority: Priority::Medium,
        }],
        RequestEvent::Scheduled {
            request_id,
            requester_id,
            recipient_id,
            recipient_name,
            scheduled_time,
        } => vec![NotificationDraft {
            recipient_id: requester_id.clone(),
            sender_id: Some(recipient_id.clone()),
            kind: NotificationType::VideoRequestScheduled,
            title: "Video Request Scheduled".to_string(),
            message: format!(
                "{recipient_name} scheduled your video session for {}",
                scheduled_time.to_rfc2822()
            ),
            data: NotificationData {
                video_request_id: Some(request_id.clone()),
                url: Some(format!("/video/requests/{request_id}")),
                ..NotificationData::default()
            },
            priority: Priority::Medium,
        }],
        RequestEvent::StartingSoon {
            request_id,
            requester_id,
            recipient_id,
            topic,
            ..
        } => [requester_id, recipient_id]
            .into_iter()
            .map(|user| NotificationDraft {
                recipient_id: user.clone(),
                sender_id: None,
                kind: NotificationType::VideoSessionStarting,
                title: "Video Session Starting Soon".to_string(),
                message: format!("Your video session \"{topic}\" starts in 5 minutes"),
                data: NotificationData {
                    video_request_id: Some(request_id.clone()),
                    url: Some(format!("/video/requests/{request_id}")),
                    ..NotificationData::default()
                },
                priority: Priority::High,
            })
            .collect(),
    }
}

/// Notifications caused by a session event.
pub fn for_session_event(event: &SessionEvent) -> Vec<NotificationDraft> {
    match event {
        SessionEvent::Invited {
            session_id,
            initiator_id,
            initiator_name,
            participant_id,
            topic,
        } => vec![NotificationDraft {
            recipient_id: participant_id.clone(),
            sender_id: Some(initiator_id.clone()),
            kind: NotificationType::SkillExchangeRequest,
            title: "New Video Session Invitation".to_string(),
            message: format!("{initiator_name} invited you to a video session about \"{topic}\""),
            data: NotificationData {
                video_session_id: Some(session_id.clone()),
                url: Some(format!("/video/session/{session_id}")),
                ..NotificationData::default()
            },
            priority: Priority::Medium,
        }],
        SessionEvent::Started { .. }
        | SessionEvent::Ended { .. }
        | SessionEvent::Cancelled { .. }
        | SessionEvent::Expired { .. } => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use skillcall_core::types::id::{RequestId, SessionId, UserId};

    use super::*;

    #[test]
    fn test_accepted_text_and_link() {
        let drafts = for_request_event(
            &RequestEvent::Accepted {
                request_id: RequestId::from("req_1_a"),
                session_id: SessionId::from("session_1_b"),
                requester_id: UserId::from("u1"),
                recipient_id: UserId::from("u2"),
                recipient_name: "Grace".to_string(),
                call_duration_minutes: 15,
            },
        );
        let draft = &drafts[0];
        assert_eq!(draft.recipient_id.as_str(), "u1");
        assert_eq!(draft.title, "Video Call Ready - 15 Minutes");
        assert_eq!(
            draft.message,
            "Grace accepted your video session request! Click to join the 15-minute video call."
        );
        assert_eq!(draft.data.url.as_deref(), Some("/video/session/session_1_b"));
        assert_eq!(draft.data.call_duration, Some(15));
        assert_eq!(draft.priority, Priority::High);
    }

    #[test]
    fn test_created_uses_request_priority() {
        let drafts = for_request_event(
            &RequestEvent::Created {
                request_id: RequestId::from("req_1_a"),
                requester_id: UserId::from("u1"),
                requester_name: "Ada".to_string(),
                recipient_id: UserId::from("u2"),
                topic: "React hooks".to_string(),
                priority: Priority::Urgent,
            },
        );
        assert_eq!(drafts[0].priority, Priority::Urgent);
        assert_eq!(
            drafts[0].message,
            "Ada wants to start a video session about \"React hooks\""
        );
    }

    #[test]
    fn test_scheduled_uses_rfc2822_time() {
        let when = Utc.with_ymd_and_hms(2026, 3, 2, 15, 30, 0).single().expect("valid time");
        let drafts = for_request_event(
            &RequestEvent::Scheduled {
                request_id: RequestId::from("req_1_a"),
                requester_id: UserId::from("u1"),
                recipient_id: UserId::from("u2"),
                recipient_name: "Grace".to_string(),
                scheduled_time: when,
            },
        );
        assert_eq!(
            drafts[0].message,
            "Grace scheduled your video session for Mon, 2 Mar 2026 15:30:00 +0000"
        );
    }

    #[test]
    fn test_starting_soon_goes_to_both_parties() {
        let drafts = for_request_event(
            &RequestEvent::StartingSoon {
                request_id: RequestId::from("req_1_a"),
                requester_id: UserId::from("u1"),
                recipient_id: UserId::from("u2"),
                topic: "React hooks".to_string(),
                scheduled_time: Utc::now(),
            },
        );
        let recipients: Vec<&str> = drafts.iter().map(|d| d.recipient_id.as_str()).collect();
        assert_eq!(recipients, vec!["u1", "u2"]);
    }
}
