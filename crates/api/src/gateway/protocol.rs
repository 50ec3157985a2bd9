//! WebSocket wire format.
//!
//! Every frame is a JSON text frame shaped `{"event": <name>, "data": ...}`.
//! Inbound frames may add `"ack": <u64>`; the gateway then answers with an
//! `ack` event carrying the same id once the event has been handled.

use domain::models::{
    Alert, AlertKind, LocationUpdateRequest, OfficerLoginRequest, ResolvedAlert,
    StartTrackingRequest, TrackingUpdate,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Events pushed from the gateway to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    NewCameraAlert(Alert),
    NewSosAlert(Alert),
    CameraAlertResolved(ResolvedAlert),
    SosAlertResolved(ResolvedAlert),
    AlertsCleared(Empty),
    AllCameraAlerts(Vec<Alert>),
    AllSosAlerts(Vec<Alert>),
    TrackingUpdate(TrackingUpdate),
    Ack(Ack),
}

/// Serialises as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// Reply to an inbound frame that requested acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub id: u64,
    pub data: Value,
}

impl ServerEvent {
    pub fn new_alert(kind: AlertKind, alert: Alert) -> Self {
        match kind {
            AlertKind::Camera => ServerEvent::NewCameraAlert(alert),
            AlertKind::Sos => ServerEvent::NewSosAlert(alert),
        }
    }

    pub fn resolved(kind: AlertKind, id: Option<Value>) -> Self {
        let payload = ResolvedAlert { id };
        match kind {
            AlertKind::Camera => ServerEvent::CameraAlertResolved(payload),
            AlertKind::Sos => ServerEvent::SosAlertResolved(payload),
        }
    }

    pub fn all_alerts(kind: AlertKind, alerts: Vec<Alert>) -> Self {
        match kind {
            AlertKind::Camera => ServerEvent::AllCameraAlerts(alerts),
            AlertKind::Sos => ServerEvent::AllSosAlerts(alerts),
        }
    }

    pub fn ack(id: u64, data: impl Serialize) -> Self {
        ServerEvent::Ack(Ack {
            id,
            data: serde_json::to_value(data).unwrap_or(Value::Null),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::NewCameraAlert(_) => "new_camera_alert",
            ServerEvent::NewSosAlert(_) => "new_sos_alert",
            ServerEvent::CameraAlertResolved(_) => "camera_alert_resolved",
            ServerEvent::SosAlertResolved(_) => "sos_alert_resolved",
            ServerEvent::AlertsCleared(_) => "alerts_cleared",
            ServerEvent::AllCameraAlerts(_) => "all_camera_alerts",
            ServerEvent::AllSosAlerts(_) => "all_sos_alerts",
            ServerEvent::TrackingUpdate(_) => "tracking_update",
            ServerEvent::Ack(_) => "ack",
        }
    }
}

/// Events sent by clients.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    OfficerLogin(OfficerLoginRequest),
    UpdateLocation(LocationUpdateRequest),
    StartTracking(StartTrackingRequest),
    StopTracking,
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::OfficerLogin(_) => "officer_login",
            ClientEvent::UpdateLocation(_) => "update_location",
            ClientEvent::StartTracking(_) => "start_tracking",
            ClientEvent::StopTracking => "stop_tracking",
        }
    }
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientFrame {
    pub event: ClientEvent,
    pub ack: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Invalid payload for {event}: {source}")]
    InvalidPayload {
        event: &'static str,
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    ack: Option<u64>,
}

impl ClientFrame {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let raw: RawFrame = serde_json::from_str(text)?;

        let event = match raw.event.as_str() {
            "officer_login" => ClientEvent::OfficerLogin(payload("officer_login", raw.data)?),
            "update_location" => {
                ClientEvent::UpdateLocation(payload("update_location", raw.data)?)
            }
            "start_tracking" => ClientEvent::StartTracking(payload("start_tracking", raw.data)?),
            "stop_tracking" => ClientEvent::StopTracking,
            _ => return Err(ProtocolError::UnknownEvent(raw.event)),
        };

        Ok(Self {
            event,
            ack: raw.ack,
        })
    }
}

// A missing or null payload means "all fields absent".
fn payload<T>(event: &'static str, data: Value) -> Result<T, ProtocolError>
where
    T: DeserializeOwned + Default,
{
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data).map_err(|source| ProtocolError::InvalidPayload { event, source })
}
