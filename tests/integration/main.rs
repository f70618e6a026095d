//! Integration tests driving the HTTP router and the WebSocket endpoint
//! against the in-memory store.

mod helpers;

mod notification_test;
mod request_test;
mod session_test;
mod ws_test;
