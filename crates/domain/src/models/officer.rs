//! Officer (identified connection) domain model.
//!
//! Login and location fields are stored exactly as the client sent them:
//! a string `lat` is kept as a string and echoed back unchanged.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Identifier of one live gateway connection.
pub type ConnectionId = Uuid;

/// An officer bound to a live connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Officer {
    pub connection_id: ConnectionId,
    pub name: Option<Value>,
    pub lat: Option<Value>,
    pub lng: Option<Value>,
    pub unit: Option<Value>,
}

/// Payload of the `officer_login` event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OfficerLoginRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub lat: Option<Value>,
    #[serde(default)]
    pub lng: Option<Value>,
    #[serde(default)]
    pub unit: Option<Value>,
}

/// Payload of the `update_location` event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LocationUpdateRequest {
    #[serde(default)]
    pub lat: Option<Value>,
    #[serde(default)]
    pub lng: Option<Value>,
}

impl Officer {
    pub fn from_login(connection_id: ConnectionId, login: OfficerLoginRequest) -> Self {
        Self {
            connection_id,
            name: login.name,
            lat: login.lat,
            lng: login.lng,
            unit: login.unit,
        }
    }

    /// Display name for log lines. Non-string names are rendered as JSON.
    pub fn display_name(&self) -> Cow<'_, str> {
        match &self.name {
            Some(Value::String(name)) => Cow::Borrowed(name),
            Some(Value::Null) | None => Cow::Borrowed("Unknown"),
            Some(other) => Cow::Owned(other.to_string()),
        }
    }
}
