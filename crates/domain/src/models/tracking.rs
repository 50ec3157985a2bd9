//! Tracking session domain model.
//!
//! Alert fields are kept as the client sent them and echoed back verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::officer::ConnectionId;

/// Identifier of a tracking session.
pub type TrackingId = Uuid;

/// Links one officer's live position to one alert's fixed position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingSession {
    pub tracking_id: TrackingId,
    pub alert_id: Option<Value>,
    pub alert_type: Option<Value>,
    pub alert_lat: Option<Value>,
    pub alert_lng: Option<Value>,
    pub officer_connection_id: ConnectionId,
    pub start_time: DateTime<Utc>,
}

impl TrackingSession {
    /// Pairs the officer's position with this session's alert position.
    pub fn update_for(
        &self,
        officer_lat: Option<Value>,
        officer_lng: Option<Value>,
    ) -> TrackingUpdate {
        TrackingUpdate {
            tracking_id: self.tracking_id,
            tracking_data: TrackingData {
                officer_lat,
                officer_lng,
                alert_lat: self.alert_lat.clone(),
                alert_lng: self.alert_lng.clone(),
            },
        }
    }
}

/// Payload of the `start_tracking` event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTrackingRequest {
    #[serde(default)]
    pub alert_id: Option<Value>,
    #[serde(default)]
    pub alert_type: Option<Value>,
    #[serde(default)]
    pub alert_lat: Option<Value>,
    #[serde(default)]
    pub alert_lng: Option<Value>,
}

/// Acknowledgement of `start_tracking`. `None` when the sender never logged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTrackingResponse {
    pub tracking_id: Option<TrackingId>,
}

/// Payload of the `tracking_update` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingUpdate {
    pub tracking_id: TrackingId,
    pub tracking_data: TrackingData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingData {
    pub officer_lat: Option<Value>,
    pub officer_lng: Option<Value>,
    pub alert_lat: Option<Value>,
    pub alert_lng: Option<Value>,
}
