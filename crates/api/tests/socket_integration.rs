//! End-to-end tests for the `/ws` endpoint over a real TCP socket.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use common::{create_test_app, get_request, officer_name, parse_response_body, TestApp};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Serve the app on an ephemeral port.
async fn serve(app: &TestApp) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}

async fn connect_ws(addr: SocketAddr) -> Client {
    let url = format!("ws://{}/ws", addr);
    let (stream, _response) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("WebSocket connect failed");
    stream
}

/// Next text frame from the server, decoded as JSON.
async fn next_text(ws: &mut Client) -> Value {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("Timed out waiting for frame")
            .expect("Socket closed")
            .expect("Socket error");
        match message {
            Message::Text(text) => return serde_json::from_str(&text).unwrap(),
            Message::Close(frame) => panic!("Unexpected close: {:?}", frame),
            _ => {}
        }
    }
}

async fn connected_clients(app: &TestApp) -> Value {
    let response = app
        .router
        .clone()
        .oneshot(get_request("/health"))
        .await
        .unwrap();
    parse_response_body(response).await["connectedClients"].clone()
}

/// Poll /health until `connectedClients` reaches `expected`.
async fn wait_for_clients(app: &TestApp, expected: u64) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let count = connected_clients(app).await;
        if count == json!(expected) {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "connectedClients stuck at {}, expected {}",
            count,
            expected
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn test_socket_login_snapshot_and_disconnect() {
    let app = create_test_app();
    let addr = serve(&app).await;
    let mut ws = connect_ws(addr).await;

    // A bad frame is dropped without closing the socket.
    ws.send(Message::Text("not json".into())).await.unwrap();
    ws.send(Message::Text(
        json!({"event": "officer_login", "data": {"name": officer_name(), "lat": "12.5"}, "ack": 1})
            .to_string(),
    ))
    .await
    .unwrap();

    let camera = next_text(&mut ws).await;
    assert_eq!(camera, json!({"event": "all_camera_alerts", "data": []}));
    let sos = next_text(&mut ws).await;
    assert_eq!(sos, json!({"event": "all_sos_alerts", "data": []}));
    let ack = next_text(&mut ws).await;
    assert_eq!(ack["event"], "ack");
    assert_eq!(ack["data"]["id"], 1);

    wait_for_clients(&app, 1).await;

    ws.close(None).await.unwrap();
    wait_for_clients(&app, 0).await;
    assert_eq!(app.gateway.status().await.unwrap().connections, 0);
}

#[tokio::test]
async fn test_socket_receives_alert_broadcast() {
    let app = create_test_app();
    let addr = serve(&app).await;
    let mut ws = connect_ws(addr).await;

    // The socket is registered once the gateway counts it.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while app.gateway.status().await.unwrap().connections == 0 {
        assert!(tokio::time::Instant::now() < deadline, "Socket never registered");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let response = app
        .router
        .clone()
        .oneshot(common::json_request(
            axum::http::Method::POST,
            "/send-alert",
            json!({"type": "sos", "id": 7}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let event = next_text(&mut ws).await;
    assert_eq!(event["event"], "new_sos_alert");
    assert_eq!(event["data"]["id"], 7);
}
