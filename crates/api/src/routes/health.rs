//! Health check endpoint handlers.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::gateway::GatewayStatus;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    /// Seconds since the gateway started.
    pub uptime: u64,
    pub alert_count: usize,
    /// Connections that have identified as officers.
    pub connected_clients: usize,
}

impl From<GatewayStatus> for HealthResponse {
    fn from(status: GatewayStatus) -> Self {
        Self {
            status: "healthy".to_string(),
            uptime: status.uptime_secs,
            alert_count: status.alert_count,
            connected_clients: status.identified_officers,
        }
    }
}

/// Simple status response for liveness probes.
#[derive(Debug, Serialize)]
pub struct LiveResponse {
    pub status: String,
}

/// Full health check endpoint.
///
/// Fails with 503 when the gateway actor is gone.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let status = state.gateway.status().await?;
    Ok(Json(status.into()))
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<LiveResponse> {
    Json(LiveResponse {
        status: "alive".to_string(),
    })
}
