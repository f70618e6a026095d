//! Integration tests for direct sessions, room credentials and feedback.

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;

use skillcall_core::types::id::SessionId;
use skillcall_database::SessionStore;
use skillcall_database::store::memory::rewind_session;

use crate::helpers::TestApp;

async fn invite(app: &TestApp, from: &str, to: &str) -> String {
    let response = app
        .call(
            from,
            "POST",
            "/api/sessions",
            Some(json!({ "participant_id": to, "topic": "Pairing on lifetimes" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.data()["status"], "pending");
    response.data()["id"].as_str().expect("session id").to_string()
}

#[tokio::test]
async fn test_direct_session_full_lifecycle() {
    let app = TestApp::new().await;
    let id = invite(&app, "u1", "u2").await;

    // Only the invited participant may answer the invitation.
    let wrong = app
        .call("u1", "POST", &format!("/api/sessions/{id}/accept"), None)
        .await;
    assert_eq!(wrong.status, StatusCode::NOT_FOUND);

    let accepted = app
        .call("u2", "POST", &format!("/api/sessions/{id}/accept"), None)
        .await;
    assert_eq!(accepted.status, StatusCode::OK);
    assert_eq!(accepted.data()["status"], "active");
    assert!(accepted.data()["start_time"].is_string());

    let token = app
        .call("u1", "POST", &format!("/api/sessions/{id}/room-token"), None)
        .await;
    assert_eq!(token.status, StatusCode::OK);
    assert!(!token.data()["token"].as_str().expect("token").is_empty());
    let room_name = token.data()["room_name"].clone();

    let again = app
        .call("u2", "POST", &format!("/api/sessions/{id}/room-token"), None)
        .await;
    assert_eq!(again.data()["room_name"], room_name);

    let early_feedback = app
        .call(
            "u2",
            "POST",
            &format!("/api/sessions/{id}/feedback"),
            Some(json!({ "rating": 5 })),
        )
        .await;
    assert_eq!(early_feedback.status, StatusCode::NOT_FOUND);

    let ended = app
        .call("u2", "POST", &format!("/api/sessions/{id}/end"), None)
        .await;
    assert_eq!(ended.status, StatusCode::OK);
    assert_eq!(ended.data()["status"], "completed");

    let rated = app
        .call(
            "u2",
            "POST",
            &format!("/api/sessions/{id}/feedback"),
            Some(json!({ "rating": 4, "feedback": "Very helpful" })),
        )
        .await;
    assert_eq!(rated.status, StatusCode::OK);
    assert_eq!(rated.data()["participant_rating"], 4);
    assert!(rated.data()["initiator_rating"].is_null());

    let out_of_range = app
        .call(
            "u1",
            "POST",
            &format!("/api/sessions/{id}/feedback"),
            Some(json!({ "rating": 6 })),
        )
        .await;
    assert_eq!(out_of_range.status, StatusCode::BAD_REQUEST);

    let inbox = app.notifications_for("u2", 1).await;
    assert_eq!(inbox[0].kind.as_str(), "skill_exchange_request");
    assert_eq!(inbox[0].title, "New Video Session Invitation");
}

#[tokio::test]
async fn test_overdue_session_refuses_room_token() {
    let app = TestApp::new().await;
    let id = invite(&app, "u1", "u2").await;
    app.call("u2", "POST", &format!("/api/sessions/{id}/accept"), None)
        .await;

    let session_id = SessionId::from(id.as_str());
    let mut stored = app
        .store
        .find_session(&session_id)
        .await
        .expect("find")
        .expect("exists");
    rewind_session(&mut stored, Duration::minutes(16));
    app.store.put_session(stored).await;

    let token = app
        .call("u1", "POST", &format!("/api/sessions/{id}/room-token"), None)
        .await;
    assert_eq!(token.status, StatusCode::NOT_FOUND);
    assert_eq!(token.body["message"], "session not active");

    let read = app
        .call("u2", "GET", &format!("/api/sessions/{id}"), None)
        .await;
    assert_eq!(read.data()["status"], "expired");
    assert_eq!(read.data()["remaining_seconds"], 0);

    let end = app
        .call("u1", "POST", &format!("/api/sessions/{id}/end"), None)
        .await;
    assert_eq!(end.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_outsiders_are_kept_out() {
    let app = TestApp::new().await;
    let id = invite(&app, "u1", "u2").await;

    let read = app
        .call("u3", "GET", &format!("/api/sessions/{id}"), None)
        .await;
    assert_eq!(read.status, StatusCode::FORBIDDEN);

    let room = app
        .call("u3", "GET", &format!("/api/sessions/{id}/room"), None)
        .await;
    assert_eq!(room.status, StatusCode::FORBIDDEN);

    let cancel = app
        .call("u3", "POST", &format!("/api/sessions/{id}/cancel"), None)
        .await;
    assert_eq!(cancel.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_second_open_session_for_pair_conflicts() {
    let app = TestApp::new().await;
    invite(&app, "u1", "u2").await;

    let reverse = app
        .call("u2", "POST", "/api/sessions", Some(json!({ "participant_id": "u1" })))
        .await;
    assert_eq!(reverse.status, StatusCode::BAD_REQUEST);
    assert_eq!(reverse.body["error"], "CONFLICT");

    let other_pair = app
        .call("u1", "POST", "/api/sessions", Some(json!({ "participant_id": "u3" })))
        .await;
    assert_eq!(other_pair.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_cancel_and_decline_close_pending_sessions() {
    let app = TestApp::new().await;

    let first = invite(&app, "u1", "u2").await;
    let cancelled = app
        .call("u1", "POST", &format!("/api/sessions/{first}/cancel"), None)
        .await;
    assert_eq!(cancelled.status, StatusCode::OK);
    assert_eq!(cancelled.data()["status"], "cancelled");

    let second = invite(&app, "u1", "u2").await;
    let declined = app
        .call("u2", "POST", &format!("/api/sessions/{second}/decline"), None)
        .await;
    assert_eq!(declined.status, StatusCode::OK);
    assert_eq!(declined.data()["status"], "cancelled");

    let listed = app.call("u2", "GET", "/api/sessions", None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.data()["total_items"], 2);
}
