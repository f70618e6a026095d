//! Integration tests for the notification inbox.

use axum::http::StatusCode;

use crate::helpers::TestApp;

/// Three proposals to u2 leave three `video_request` notifications.
async fn seeded() -> (TestApp, Vec<String>) {
    let app = TestApp::new().await;
    app.propose("u1", "u2", "React hooks").await;
    app.propose("u3", "u2", "SQL joins").await;
    let id = app.propose("u2", "u1", "Rust traits").await;
    app.call("u1", "POST", &format!("/api/video-requests/{id}/accept"), None)
        .await;

    let inbox = app.notifications_for("u2", 3).await;
    assert_eq!(inbox.len(), 3);
    let ids = inbox.iter().map(|n| n.id.to_string()).collect();
    (app, ids)
}

#[tokio::test]
async fn test_list_reports_unread_count_and_filters_by_type() {
    let (app, _) = seeded().await;

    let listed = app.call("u2", "GET", "/api/notifications", None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.data()["total_items"], 3);
    assert_eq!(listed.data()["unread_count"], 3);

    let accepted = app
        .call("u2", "GET", "/api/notifications?type=video_request_accepted", None)
        .await;
    assert_eq!(accepted.data()["total_items"], 1);
    let item = &accepted.data()["items"][0];
    assert_eq!(item["type"], "video_request_accepted");
    assert_eq!(item["title"], "Video Call Ready - 15 Minutes");
    assert!(item["data"]["video_session_id"].is_string());

    let count = app
        .call("u2", "GET", "/api/notifications/unread-count?type=video_request", None)
        .await;
    assert_eq!(count.data()["count"], 2);
}

#[tokio::test]
async fn test_mark_read_is_idempotent() {
    let (app, ids) = seeded().await;
    let id = &ids[0];

    let first = app
        .call("u2", "PUT", &format!("/api/notifications/{id}/read"), None)
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.data()["is_read"], true);
    let read_at = first.data()["read_at"].clone();
    assert!(read_at.is_string());

    let second = app
        .call("u2", "PUT", &format!("/api/notifications/{id}/read"), None)
        .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.data()["read_at"], read_at);

    let count = app
        .call("u2", "GET", "/api/notifications/unread-count", None)
        .await;
    assert_eq!(count.data()["count"], 2);

    let unread = app
        .call("u2", "GET", "/api/notifications?is_read=false", None)
        .await;
    assert_eq!(unread.data()["total_items"], 2);
}

#[tokio::test]
async fn test_foreign_notifications_are_not_found() {
    let (app, ids) = seeded().await;
    let id = &ids[0];

    let read = app
        .call("u3", "PUT", &format!("/api/notifications/{id}/read"), None)
        .await;
    assert_eq!(read.status, StatusCode::NOT_FOUND);

    let delete = app
        .call("u3", "DELETE", &format!("/api/notifications/{id}"), None)
        .await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    let own = app
        .call("u2", "DELETE", &format!("/api/notifications/{id}"), None)
        .await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.data()["message"], "Notification deleted");

    let gone = app
        .call("u2", "DELETE", &format!("/api/notifications/{id}"), None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_read_all_marks_every_unread() {
    let (app, _) = seeded().await;

    let marked = app
        .call("u2", "PUT", "/api/notifications/read-all", None)
        .await;
    assert_eq!(marked.status, StatusCode::OK);
    assert_eq!(marked.data()["count"], 3);

    let again = app
        .call("u2", "PUT", "/api/notifications/read-all", None)
        .await;
    assert_eq!(again.data()["count"], 0);

    // Other users' inboxes are untouched.
    let theirs = app
        .call("u1", "GET", "/api/notifications/unread-count", None)
        .await;
    assert_eq!(theirs.data()["count"], 1);
}
