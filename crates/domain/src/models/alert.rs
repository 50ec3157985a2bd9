//! Alert domain model.
//!
//! Alerts are open-ended JSON objects submitted by producers (cameras, SOS
//! apps). Only `id`, `time` and `type` carry meaning for the relay; every
//! other field is passed through untouched.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Field holding the alert identifier.
pub const ID_FIELD: &str = "id";
/// Field holding the ISO-8601 submission time.
pub const TIME_FIELD: &str = "time";
/// Field holding the routing type.
pub const TYPE_FIELD: &str = "type";

/// Alert categories the relay routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// Incident detected by a camera.
    Camera,
    /// Distress signal raised by a person.
    Sos,
}

impl AlertKind {
    pub const ALL: [AlertKind; 2] = [AlertKind::Camera, AlertKind::Sos];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Camera => "camera",
            AlertKind::Sos => "sos",
        }
    }
}

/// Returned when a `type` value names no known alert category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown alert type: {0}")]
pub struct UnknownAlertKind(pub String);

impl FromStr for AlertKind {
    type Err = UnknownAlertKind;

    // Matching is exact: producers send lowercase tags and anything else is
    // treated as an unrouted alert.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "camera" => Ok(AlertKind::Camera),
            "sos" => Ok(AlertKind::Sos),
            _ => Err(UnknownAlertKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An alert record as stored and broadcast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alert(Map<String, Value>);

impl Alert {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Builds an alert from an arbitrary JSON value. Only objects qualify.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// The alert identifier as supplied, if one is set.
    ///
    /// `null` and the empty string do not count as identifiers.
    pub fn id(&self) -> Option<&Value> {
        self.0.get(ID_FIELD).filter(|v| is_usable_id(v))
    }

    /// Routing category, `None` when `type` is missing or unrecognized.
    pub fn kind(&self) -> Option<AlertKind> {
        self.0
            .get(TYPE_FIELD)
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }

    pub fn time(&self) -> Option<&str> {
        self.0.get(TIME_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// Fills in `time` and `id` when the producer left them out and returns
    /// the effective identifier.
    pub fn stamp(&mut self, now: DateTime<Utc>) -> Value {
        if self.0.get(TIME_FIELD).map_or(true, Value::is_null) {
            self.0.insert(
                TIME_FIELD.to_string(),
                Value::String(now.to_rfc3339_opts(SecondsFormat::Micros, true)),
            );
        }

        if let Some(id) = self.id() {
            return id.clone();
        }
        let id = Value::String(Uuid::new_v4().to_string());
        self.0.insert(ID_FIELD.to_string(), id.clone());
        id
    }

    /// True when the alert's identifier is exactly `id`. A string never
    /// matches a number with the same digits.
    pub fn has_id(&self, id: &Value) -> bool {
        self.id() == Some(id)
    }
}

fn is_usable_id(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Request payload for resolving an alert.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveAlertRequest {
    #[serde(default)]
    pub alert_id: Option<Value>,

    #[serde(default)]
    pub alert_type: Option<Value>,
}

impl ResolveAlertRequest {
    /// Only string types route; anything else names no list.
    pub fn kind(&self) -> Option<AlertKind> {
        self.alert_type
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }
}

/// Response payload for a submitted alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAlertResponse {
    pub status: String,
    pub id: Value,
}

/// Both alert lists, as returned by `GET /alerts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertSnapshot {
    pub camera: Vec<Alert>,
    pub sos: Vec<Alert>,
    pub count: usize,
}

impl AlertSnapshot {
    pub fn new(camera: Vec<Alert>, sos: Vec<Alert>) -> Self {
        let count = camera.len() + sos.len();
        Self { camera, sos, count }
    }
}

/// A single alert list, as returned by `GET /alerts/{type}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertList {
    pub alerts: Vec<Alert>,
    pub count: usize,
}

impl From<Vec<Alert>> for AlertList {
    fn from(alerts: Vec<Alert>) -> Self {
        let count = alerts.len();
        Self { alerts, count }
    }
}

/// Payload of the `*_alert_resolved` broadcast. The id is echoed exactly
/// as the resolver sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAlert {
    pub id: Option<Value>,
}
