//! Common test utilities for integration tests.
//!
//! Every test gets its own gateway actor, so tests never share state.

// Not every integration test uses every helper.
#![allow(dead_code)]

use std::time::Duration;

use alert_relay_api::{
    app::create_app,
    config::Config,
    gateway::{ClientFrame, Connection, GatewayHandle, ServerEvent},
};
use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use fake::{faker::name::en::Name, Fake};
use serde_json::{json, Value};

/// Test configuration built from embedded defaults.
pub fn test_config() -> Config {
    Config::load_for_test(&[]).expect("Failed to load test config")
}

/// A router plus direct access to the gateway behind it.
pub struct TestApp {
    pub router: Router,
    pub gateway: GatewayHandle,
}

/// Create a test application. Must run inside a Tokio runtime.
pub fn create_test_app() -> TestApp {
    create_test_app_with(test_config())
}

pub fn create_test_app_with(config: Config) -> TestApp {
    let gateway = GatewayHandle::spawn(config.gateway.command_buffer);
    TestApp {
        router: create_app(config, gateway.clone()),
        gateway,
    }
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn parse_response_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// Build a client frame the way a socket client would send it.
pub fn frame(event: &str, data: Value, ack: Option<u64>) -> ClientFrame {
    let mut raw = json!({"event": event, "data": data});
    if let Some(ack) = ack {
        raw["ack"] = json!(ack);
    }
    ClientFrame::parse(&raw.to_string()).expect("Invalid test frame")
}

/// Wait for the next event addressed to the connection.
pub async fn next_event(conn: &mut Connection) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(2), conn.events.recv())
        .await
        .expect("Timed out waiting for event")
        .expect("Connection outbox closed")
}

/// Assert that nothing is queued for the connection.
///
/// The status round-trip guarantees every command sent before it has been
/// handled, so anything it produced is already in the outbox.
pub async fn assert_no_event(gateway: &GatewayHandle, conn: &mut Connection) {
    gateway.status().await.expect("Gateway stopped");
    if let Ok(event) = conn.events.try_recv() {
        panic!("Unexpected event: {:?}", event);
    }
}

/// A random officer name.
pub fn officer_name() -> String {
    Name().fake()
}

/// Connect and log in an officer, draining the login snapshot.
pub async fn login_officer(gateway: &GatewayHandle, name: &str, lat: f64, lng: f64) -> Connection {
    let mut conn = gateway.connect().await.expect("Gateway stopped");
    gateway
        .dispatch(
            conn.id,
            frame(
                "officer_login",
                json!({"name": name, "lat": lat, "lng": lng, "unit": "Patrol 1"}),
                None,
            ),
        )
        .await
        .expect("Gateway stopped");

    assert!(matches!(next_event(&mut conn).await, ServerEvent::AllCameraAlerts(_)));
    assert!(matches!(next_event(&mut conn).await, ServerEvent::AllSosAlerts(_)));
    conn
}
