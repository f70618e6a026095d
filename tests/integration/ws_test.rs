//! Integration tests for WebSocket connection and messaging.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use skillcall_api::build_app;

use crate::helpers::TestApp;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Serve the app on an ephemeral port.
async fn serve(app: &TestApp) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let router = build_app(app.state.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    addr
}

/// Connect as `user` and wait until the server has registered the socket.
async fn connect(app: &TestApp, addr: SocketAddr, user: &str) -> Socket {
    let url = format!("ws://{addr}/ws?token={}", app.token(user));
    let (mut socket, _) = connect_async(url).await.expect("connect");
    send(&mut socket, json!({ "type": "ping" })).await;
    let pong = next_frame(&mut socket).await;
    assert_eq!(pong["type"], "pong");
    socket
}

async fn send(socket: &mut Socket, frame: Value) {
    socket
        .send(Message::Text(frame.to_string().into()))
        .await
        .expect("send");
}

/// Next JSON text frame, skipping control frames.
async fn next_frame(socket: &mut Socket) -> Value {
    let read = async {
        while let Some(msg) = socket.next().await {
            if let Message::Text(text) = msg.expect("frame") {
                return serde_json::from_str(text.as_str()).expect("json frame");
            }
        }
        panic!("socket closed");
    };
    tokio::time::timeout(Duration::from_secs(2), read)
        .await
        .expect("frame within timeout")
}

/// Read frames until one carries `event`.
async fn next_event(socket: &mut Socket, event: &str) -> Value {
    for _ in 0..10 {
        let frame = next_frame(socket).await;
        if frame["type"] == "event" && frame["event"] == event {
            return frame;
        }
    }
    panic!("no {event} event received");
}

#[tokio::test]
async fn test_ws_upgrade_without_token() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/ws", None, None).await;

    assert!(
        response.status == StatusCode::UNAUTHORIZED
            || response.status == StatusCode::BAD_REQUEST
            || response.status == StatusCode::UPGRADE_REQUIRED,
        "Expected 401, 400, or 426, got {}",
        response.status
    );
}

#[tokio::test]
async fn test_ws_rejects_bad_token() {
    let app = TestApp::new().await;
    let addr = serve(&app).await;

    let result = connect_async(format!("ws://{addr}/ws?token=not-a-jwt")).await;
    assert!(result.is_err());
    assert_eq!(app.state.realtime.connections.connection_count(), 0);
}

#[tokio::test]
async fn test_recipient_gets_notification_and_request_event() {
    let app = TestApp::new().await;
    let addr = serve(&app).await;
    let mut socket = connect(&app, addr, "u2").await;

    let id = app.propose("u1", "u2", "React hooks").await;

    let notification = next_event(&mut socket, "notification").await;
    assert_eq!(notification["room"], "user-u2");
    assert_eq!(notification["payload"]["type"], "video_request");
    assert_eq!(notification["payload"]["data"]["video_request_id"], id.as_str());

    let created = next_event(&mut socket, "request:created").await;
    assert_eq!(created["payload"]["requestId"], id.as_str());
    assert_eq!(created["payload"]["requesterId"], "u1");

    let stored = app.notifications_for("u2", 1).await;
    assert!(stored[0].delivery_status.in_app);
}

#[tokio::test]
async fn test_session_room_hears_call_ended() {
    let app = TestApp::new().await;
    let addr = serve(&app).await;

    let id = app.propose("u1", "u2", "React hooks").await;
    let accepted = app
        .call("u2", "POST", &format!("/api/video-requests/{id}/accept"), None)
        .await;
    let session_id = accepted.data()["session"]["id"]
        .as_str()
        .expect("session id")
        .to_string();

    let mut socket = connect(&app, addr, "u1").await;
    send(&mut socket, json!({ "type": "join_session", "session_id": session_id })).await;
    let joined = next_frame(&mut socket).await;
    assert_eq!(joined["type"], "joined");
    assert_eq!(joined["room"], format!("session-{session_id}"));

    let ended = app
        .call("u2", "POST", &format!("/api/sessions/{session_id}/end"), None)
        .await;
    assert_eq!(ended.status, StatusCode::OK);

    let frame = next_event(&mut socket, "call-ended").await;
    assert_eq!(frame["payload"]["sessionId"], session_id.as_str());
    assert_eq!(frame["payload"]["endedBy"], "u2");
}

#[tokio::test]
async fn test_malformed_frame_gets_error_reply() {
    let app = TestApp::new().await;
    let addr = serve(&app).await;
    let mut socket = connect(&app, addr, "u1").await;

    socket
        .send(Message::Text("{not json".into()))
        .await
        .expect("send");
    let reply = next_frame(&mut socket).await;
    assert_eq!(reply["type"], "error");

    // The connection survives the bad frame.
    send(&mut socket, json!({ "type": "ping" })).await;
    assert_eq!(next_frame(&mut socket).await["type"], "pong");
}

#[tokio::test]
async fn test_replaced_socket_receives_close_frame() {
    let app = TestApp::with_config(|config| config.realtime.max_connections_per_user = 1).await;
    let addr = serve(&app).await;

    let mut first = connect(&app, addr, "u1").await;
    let mut second = connect(&app, addr, "u1").await;

    let closed = async {
        while let Some(msg) = first.next().await {
            match msg {
                Ok(Message::Close(_)) | Err(_) => return,
                Ok(_) => {}
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(2), closed)
        .await
        .expect("first socket closed by the server");

    send(&mut second, json!({ "type": "ping" })).await;
    assert_eq!(next_frame(&mut second).await["type"], "pong");
    assert_eq!(app.state.realtime.connections.connection_count(), 1);
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["database"], "connected");
}
