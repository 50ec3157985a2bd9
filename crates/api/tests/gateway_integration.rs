//! Integration tests for officer sessions and tracking over the gateway.

mod common;

use alert_relay_api::gateway::ServerEvent;
use axum::http::Method;
use common::{
    assert_no_event, create_test_app, frame, get_request, json_request, login_officer, next_event,
    officer_name, parse_response_body,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn expect_ack(event: ServerEvent, id: u64) -> Value {
    match event {
        ServerEvent::Ack(ack) => {
            assert_eq!(ack.id, id);
            ack.data
        }
        other => panic!("Expected ack {}, got {:?}", id, other),
    }
}

fn start_tracking_frame(ack: u64) -> alert_relay_api::gateway::ClientFrame {
    frame(
        "start_tracking",
        json!({"alertId": "sos-1", "alertType": "sos", "alertLat": 10.0, "alertLng": 20.0}),
        Some(ack),
    )
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_receives_current_alerts() {
    let app = create_test_app();
    app.router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/send-alert",
            json!({"type": "camera", "id": "c1"}),
        ))
        .await
        .unwrap();

    let mut conn = app.gateway.connect().await.unwrap();
    // The camera broadcast is not replayed: the connection did not exist yet.
    app.gateway
        .dispatch(conn.id, frame("officer_login", json!({"name": "Ada"}), Some(1)))
        .await
        .unwrap();

    match next_event(&mut conn).await {
        ServerEvent::AllCameraAlerts(alerts) => {
            assert_eq!(alerts.len(), 1);
            assert_eq!(alerts[0].id(), Some(&json!("c1")));
        }
        other => panic!("Expected AllCameraAlerts, got {:?}", other),
    }
    match next_event(&mut conn).await {
        ServerEvent::AllSosAlerts(alerts) => assert!(alerts.is_empty()),
        other => panic!("Expected AllSosAlerts, got {:?}", other),
    }
    assert_eq!(expect_ack(next_event(&mut conn).await, 1), Value::Null);
}

#[tokio::test]
async fn test_login_with_string_coordinates_identifies_officer() {
    let app = create_test_app();
    let mut conn = app.gateway.connect().await.unwrap();

    app.gateway
        .dispatch(
            conn.id,
            frame("officer_login", json!({"name": 42, "lat": "12.5", "lng": "7"}), None),
        )
        .await
        .unwrap();

    assert!(matches!(next_event(&mut conn).await, ServerEvent::AllCameraAlerts(_)));
    assert!(matches!(next_event(&mut conn).await, ServerEvent::AllSosAlerts(_)));
    assert_eq!(app.gateway.status().await.unwrap().identified_officers, 1);

    app.gateway
        .dispatch(
            conn.id,
            frame(
                "start_tracking",
                json!({"alertId": 3, "alertLat": "10.0", "alertLng": null}),
                Some(2),
            ),
        )
        .await
        .unwrap();

    let value = serde_json::to_value(next_event(&mut conn).await).unwrap();
    assert_eq!(
        value["data"]["trackingData"],
        json!({"officerLat": "12.5", "officerLng": "7", "alertLat": "10.0", "alertLng": null})
    );
    let ack = expect_ack(next_event(&mut conn).await, 2);
    assert!(ack["trackingId"].is_string());
}

#[tokio::test]
async fn test_connected_clients_counts_identified_officers_only() {
    let app = create_test_app();
    let _anonymous = app.gateway.connect().await.unwrap();
    let _officer = login_officer(&app.gateway, &officer_name(), 1.0, 2.0).await;

    let response = app
        .router
        .clone()
        .oneshot(get_request("/health"))
        .await
        .unwrap();
    let body = parse_response_body(response).await;

    assert_eq!(body["connectedClients"], 1);
    let status = app.gateway.status().await.unwrap();
    assert_eq!(status.connections, 2);
    assert_eq!(status.identified_officers, 1);
}

#[tokio::test]
async fn test_repeated_login_replaces_officer() {
    let app = create_test_app();
    let mut conn = login_officer(&app.gateway, &officer_name(), 1.0, 2.0).await;

    app.gateway
        .dispatch(conn.id, frame("officer_login", json!({"name": "Ada Lovelace"}), None))
        .await
        .unwrap();
    next_event(&mut conn).await;
    next_event(&mut conn).await;

    assert_eq!(app.gateway.status().await.unwrap().identified_officers, 1);
}

// ============================================================================
// Tracking
// ============================================================================

#[tokio::test]
async fn test_start_tracking_sends_update_and_ack() {
    let app = create_test_app();
    let mut conn = login_officer(&app.gateway, &officer_name(), 1.0, 2.0).await;

    app.gateway
        .dispatch(conn.id, start_tracking_frame(1))
        .await
        .unwrap();

    let tracking_id = match next_event(&mut conn).await {
        ServerEvent::TrackingUpdate(update) => {
            assert_eq!(update.tracking_data.officer_lat, Some(json!(1.0)));
            assert_eq!(update.tracking_data.officer_lng, Some(json!(2.0)));
            assert_eq!(update.tracking_data.alert_lat, Some(json!(10.0)));
            assert_eq!(update.tracking_data.alert_lng, Some(json!(20.0)));
            update.tracking_id
        }
        other => panic!("Expected TrackingUpdate, got {:?}", other),
    };

    let ack = expect_ack(next_event(&mut conn).await, 1);
    assert_eq!(ack, json!({"trackingId": tracking_id.to_string()}));
    assert_eq!(app.gateway.status().await.unwrap().tracking_sessions, 1);
}

#[tokio::test]
async fn test_location_update_pushes_tracking_update() {
    let app = create_test_app();
    let mut conn = login_officer(&app.gateway, &officer_name(), 1.0, 2.0).await;
    app.gateway
        .dispatch(conn.id, start_tracking_frame(1))
        .await
        .unwrap();
    next_event(&mut conn).await;
    next_event(&mut conn).await;

    app.gateway
        .dispatch(
            conn.id,
            frame("update_location", json!({"lat": 3.5, "lng": 4.5}), None),
        )
        .await
        .unwrap();

    let event = next_event(&mut conn).await;
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["event"], "tracking_update");
    assert_eq!(
        value["data"]["trackingData"],
        json!({"officerLat": 3.5, "officerLng": 4.5, "alertLat": 10.0, "alertLng": 20.0})
    );
}

#[tokio::test]
async fn test_each_session_gets_an_update() {
    let app = create_test_app();
    let mut conn = login_officer(&app.gateway, &officer_name(), 1.0, 2.0).await;
    for ack in [1, 2] {
        app.gateway
            .dispatch(conn.id, start_tracking_frame(ack))
            .await
            .unwrap();
        next_event(&mut conn).await;
        next_event(&mut conn).await;
    }

    app.gateway
        .dispatch(
            conn.id,
            frame("update_location", json!({"lat": 5.0, "lng": 6.0}), None),
        )
        .await
        .unwrap();

    let first = next_event(&mut conn).await;
    let second = next_event(&mut conn).await;
    assert_eq!(first.name(), "tracking_update");
    assert_eq!(second.name(), "tracking_update");
    assert_no_event(&app.gateway, &mut conn).await;
}

#[tokio::test]
async fn test_stop_tracking_ends_updates() {
    let app = create_test_app();
    let mut conn = login_officer(&app.gateway, &officer_name(), 1.0, 2.0).await;
    app.gateway
        .dispatch(conn.id, start_tracking_frame(1))
        .await
        .unwrap();
    next_event(&mut conn).await;
    next_event(&mut conn).await;

    app.gateway
        .dispatch(conn.id, frame("stop_tracking", Value::Null, Some(2)))
        .await
        .unwrap();
    assert_eq!(
        expect_ack(next_event(&mut conn).await, 2),
        json!({"status": "success"})
    );

    app.gateway
        .dispatch(
            conn.id,
            frame("update_location", json!({"lat": 3.0, "lng": 4.0}), None),
        )
        .await
        .unwrap();
    assert_no_event(&app.gateway, &mut conn).await;
    assert_eq!(app.gateway.status().await.unwrap().tracking_sessions, 0);
}

#[tokio::test]
async fn test_stop_tracking_without_sessions_succeeds() {
    let app = create_test_app();
    let mut conn = app.gateway.connect().await.unwrap();

    app.gateway
        .dispatch(conn.id, frame("stop_tracking", json!({}), Some(9)))
        .await
        .unwrap();

    assert_eq!(
        expect_ack(next_event(&mut conn).await, 9),
        json!({"status": "success"})
    );
}

#[tokio::test]
async fn test_start_tracking_requires_login() {
    let app = create_test_app();
    let mut conn = app.gateway.connect().await.unwrap();

    app.gateway
        .dispatch(conn.id, start_tracking_frame(4))
        .await
        .unwrap();

    assert_eq!(
        expect_ack(next_event(&mut conn).await, 4),
        json!({"trackingId": null})
    );
    assert_no_event(&app.gateway, &mut conn).await;
    assert_eq!(app.gateway.status().await.unwrap().tracking_sessions, 0);
}

#[tokio::test]
async fn test_location_update_without_login_is_ignored() {
    let app = create_test_app();
    let mut conn = app.gateway.connect().await.unwrap();

    app.gateway
        .dispatch(
            conn.id,
            frame("update_location", json!({"lat": 1.0, "lng": 1.0}), None),
        )
        .await
        .unwrap();

    assert_no_event(&app.gateway, &mut conn).await;
    assert_eq!(app.gateway.status().await.unwrap().identified_officers, 0);
}

#[tokio::test]
async fn test_tracking_updates_stay_private() {
    let app = create_test_app();
    let mut tracker = login_officer(&app.gateway, &officer_name(), 1.0, 2.0).await;
    let mut other = login_officer(&app.gateway, &officer_name(), 0.0, 0.0).await;

    app.gateway
        .dispatch(tracker.id, start_tracking_frame(1))
        .await
        .unwrap();
    next_event(&mut tracker).await;
    next_event(&mut tracker).await;
    app.gateway
        .dispatch(
            tracker.id,
            frame("update_location", json!({"lat": 2.0, "lng": 3.0}), None),
        )
        .await
        .unwrap();

    assert_eq!(next_event(&mut tracker).await.name(), "tracking_update");
    assert_no_event(&app.gateway, &mut other).await;
}

// ============================================================================
// Disconnect
// ============================================================================

#[tokio::test]
async fn test_disconnect_removes_officer_and_sessions() {
    let app = create_test_app();
    let mut conn = login_officer(&app.gateway, &officer_name(), 1.0, 2.0).await;
    app.gateway
        .dispatch(conn.id, start_tracking_frame(1))
        .await
        .unwrap();
    next_event(&mut conn).await;
    next_event(&mut conn).await;

    app.gateway.disconnect(conn.id).await.unwrap();

    let status = app.gateway.status().await.unwrap();
    assert_eq!(status.connections, 0);
    assert_eq!(status.identified_officers, 0);
    assert_eq!(status.tracking_sessions, 0);
}

#[tokio::test]
async fn test_disconnected_connection_gets_no_broadcasts() {
    let app = create_test_app();
    let mut gone = app.gateway.connect().await.unwrap();
    let mut stays = app.gateway.connect().await.unwrap();
    app.gateway.disconnect(gone.id).await.unwrap();

    app.router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/send-alert",
            json!({"type": "sos"}),
        ))
        .await
        .unwrap();

    assert_eq!(next_event(&mut stays).await.name(), "new_sos_alert");
    assert!(gone.events.recv().await.is_none());
}

#[tokio::test]
async fn test_events_after_disconnect_are_dropped() {
    let app = create_test_app();
    let conn = app.gateway.connect().await.unwrap();
    app.gateway.disconnect(conn.id).await.unwrap();

    app.gateway
        .dispatch(conn.id, frame("officer_login", json!({"name": "Ghost"}), None))
        .await
        .unwrap();

    assert_eq!(app.gateway.status().await.unwrap().identified_officers, 0);
}
