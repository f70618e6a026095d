//! Integration tests for the call request lifecycle.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use skillcall_core::types::id::RequestId;
use skillcall_database::RequestStore;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_accept_creates_active_session_and_notifies_requester() {
    let app = TestApp::new().await;
    let id = app.propose("u1", "u2", "React hooks").await;

    let response = app
        .call("u2", "POST", &format!("/api/video-requests/{id}/accept"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let data = response.data();
    assert_eq!(data["request"]["status"], "accepted");
    assert_eq!(data["session"]["status"], "active");
    assert_eq!(data["session"]["initiator_id"], "u1");
    assert_eq!(data["session"]["participant_id"], "u2");
    assert_eq!(data["request"]["session_id"], data["session"]["id"]);

    let inbox = app.notifications_for("u1", 1).await;
    assert!(
        inbox
            .iter()
            .any(|n| n.kind.as_str() == "video_request_accepted"),
        "{inbox:?}"
    );
}

#[tokio::test]
async fn test_second_pending_request_conflicts_but_reverse_is_allowed() {
    let app = TestApp::new().await;
    app.propose("u1", "u2", "React hooks").await;

    let again = app
        .call(
            "u1",
            "POST",
            "/api/video-requests",
            Some(json!({ "recipient_id": "u2", "topic": "Rust" })),
        )
        .await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.body["success"], false);
    assert_eq!(again.body["error"], "CONFLICT");

    app.propose("u2", "u1", "Go").await;
}

#[tokio::test]
async fn test_create_validation() {
    let app = TestApp::new().await;

    let missing = app
        .call("u1", "POST", "/api/video-requests", Some(json!({ "topic": "x" })))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let unknown = app
        .call("u1", "POST", "/api/video-requests", Some(json!({ "recipient_id": "nobody" })))
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let own = app
        .call("u1", "POST", "/api/video-requests", Some(json!({ "recipient_id": "u1" })))
        .await;
    assert_eq!(own.status, StatusCode::BAD_REQUEST);

    let anonymous = app
        .request("POST", "/api/video-requests", Some(json!({ "recipient_id": "u2" })), None)
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_defaults() {
    let app = TestApp::new().await;
    let response = app
        .call("u1", "POST", "/api/video-requests", Some(json!({ "recipient_id": "u2" })))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let data = response.data();
    assert_eq!(data["topic"], "Skill Exchange Session");
    assert_eq!(data["priority"], "medium");
    assert_eq!(data["status"], "pending");
    assert!(data["id"].as_str().expect("id").starts_with("req_"));
}

#[tokio::test]
async fn test_only_recipient_may_answer() {
    let app = TestApp::new().await;
    let id = app.propose("u1", "u2", "React hooks").await;

    for user in ["u1", "u3"] {
        let response = app
            .call(user, "POST", &format!("/api/video-requests/{id}/accept"), None)
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body["message"], "Request not found or already processed");
    }

    let outsider = app
        .call("u3", "GET", &format!("/api/video-requests/{id}"), None)
        .await;
    assert_eq!(outsider.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_lapsed_request_cannot_be_answered_before_sweep() {
    let app = TestApp::new().await;
    let id = app.propose("u1", "u2", "React hooks").await;

    let mut stored = app
        .store
        .find_request(&RequestId::from(id.as_str()))
        .await
        .expect("find")
        .expect("exists");
    stored.expires_at = Utc::now() - Duration::seconds(1);
    app.store.put_request(stored).await;

    for action in ["accept", "decline"] {
        let response = app
            .call("u2", "POST", &format!("/api/video-requests/{id}/{action}"), None)
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{action}");
    }
    let schedule = app
        .call(
            "u2",
            "POST",
            &format!("/api/video-requests/{id}/schedule"),
            Some(json!({ "scheduled_time": Utc::now() + Duration::hours(2) })),
        )
        .await;
    assert_eq!(schedule.status, StatusCode::NOT_FOUND);

    let read = app
        .call("u1", "GET", &format!("/api/video-requests/{id}"), None)
        .await;
    assert_eq!(read.data()["status"], "expired");

    // The slot is free again for the same ordered pair.
    app.propose("u1", "u2", "React hooks, again").await;
}

#[tokio::test]
async fn test_schedule_requires_time() {
    let app = TestApp::new().await;
    let id = app.propose("u1", "u2", "React hooks").await;

    let missing = app
        .call("u2", "POST", &format!("/api/video-requests/{id}/schedule"), Some(json!({})))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let when = Utc::now() + Duration::days(1);
    let scheduled = app
        .call(
            "u2",
            "POST",
            &format!("/api/video-requests/{id}/schedule"),
            Some(json!({ "scheduled_time": when, "message": "Tomorrow works" })),
        )
        .await;
    assert_eq!(scheduled.status, StatusCode::OK);
    assert_eq!(scheduled.data()["status"], "scheduled");
    assert_eq!(scheduled.data()["response_message"], "Tomorrow works");
}

#[tokio::test]
async fn test_decline_then_answers_are_refused() {
    let app = TestApp::new().await;
    let id = app.propose("u1", "u2", "React hooks").await;

    let declined = app
        .call(
            "u2",
            "POST",
            &format!("/api/video-requests/{id}/decline"),
            Some(json!({ "message": "Busy this week" })),
        )
        .await;
    assert_eq!(declined.status, StatusCode::OK);
    assert_eq!(declined.data()["status"], "declined");

    let accept = app
        .call("u2", "POST", &format!("/api/video-requests/{id}/accept"), None)
        .await;
    assert_eq!(accept.status, StatusCode::NOT_FOUND);

    let inbox = app.notifications_for("u1", 1).await;
    assert!(inbox.iter().any(|n| n.kind.as_str() == "video_request_declined"));
}

#[tokio::test]
async fn test_list_and_pending_count() {
    let app = TestApp::new().await;
    app.propose("u1", "u2", "React hooks").await;
    app.propose("u3", "u2", "SQL").await;

    let count = app
        .call("u2", "GET", "/api/video-requests/pending-count", None)
        .await;
    assert_eq!(count.data()["count"], 2);

    let received = app
        .call("u2", "GET", "/api/video-requests?direction=received&per_page=1", None)
        .await;
    assert_eq!(received.status, StatusCode::OK);
    assert_eq!(received.data()["total_items"], 2);
    assert_eq!(received.data()["items"].as_array().expect("items").len(), 1);
    assert_eq!(received.data()["has_next"], true);

    let sent = app
        .call("u2", "GET", "/api/video-requests?direction=sent", None)
        .await;
    assert_eq!(sent.data()["total_items"], 0);

    let accepted_only = app
        .call("u2", "GET", "/api/video-requests?status=accepted", None)
        .await;
    assert_eq!(accepted_only.data()["total_items"], 0);
}

#[tokio::test]
async fn test_accept_refused_while_pair_has_open_session() {
    let app = TestApp::new().await;

    let invite = app
        .call("u2", "POST", "/api/sessions", Some(json!({ "participant_id": "u1" })))
        .await;
    assert_eq!(invite.status, StatusCode::CREATED);

    let id = app.propose("u1", "u2", "React hooks").await;
    let accept = app
        .call("u2", "POST", &format!("/api/video-requests/{id}/accept"), None)
        .await;
    assert_eq!(accept.status, StatusCode::BAD_REQUEST);
    assert_eq!(accept.body["error"], "CONFLICT");

    let still_pending = app
        .call("u2", "GET", &format!("/api/video-requests/{id}"), None)
        .await;
    assert_eq!(still_pending.data()["status"], "pending");
    assert!(still_pending.data()["session_id"].is_null());
}
