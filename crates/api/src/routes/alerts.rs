//! Alert endpoint handlers.

use axum::{extract::State, Json};
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::{
    Alert, AlertKind, AlertList, AlertSnapshot, ResolveAlertRequest, StatusResponse,
    SubmitAlertResponse,
};

/// Submit an alert and broadcast it to every connection.
///
/// POST /send-alert
pub async fn send_alert(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<SubmitAlertResponse>, ApiError> {
    let alert = Alert::from_value(body)
        .ok_or_else(|| ApiError::Validation("Alert must be a JSON object".to_string()))?;

    let id = state.gateway.submit_alert(alert).await?;

    Ok(Json(SubmitAlertResponse {
        status: "success".to_string(),
        id,
    }))
}

/// GET /alerts
pub async fn get_alerts(State(state): State<AppState>) -> Result<Json<AlertSnapshot>, ApiError> {
    Ok(Json(state.gateway.alerts().await?))
}

/// GET /alerts/camera
pub async fn get_camera_alerts(State(state): State<AppState>) -> Result<Json<AlertList>, ApiError> {
    alerts_of_kind(&state, AlertKind::Camera).await
}

/// GET /alerts/sos
pub async fn get_sos_alerts(State(state): State<AppState>) -> Result<Json<AlertList>, ApiError> {
    alerts_of_kind(&state, AlertKind::Sos).await
}

async fn alerts_of_kind(state: &AppState, kind: AlertKind) -> Result<Json<AlertList>, ApiError> {
    let alerts = state.gateway.alerts_of_kind(kind).await?;
    Ok(Json(AlertList::from(alerts)))
}

/// Remove an alert. Unknown ids and types still succeed.
///
/// POST /resolve-alert
pub async fn resolve_alert(
    State(state): State<AppState>,
    Json(request): Json<ResolveAlertRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.gateway.resolve_alert(request).await?;
    Ok(Json(StatusResponse::success()))
}

/// POST /clear-alerts
pub async fn clear_alerts(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    state.gateway.clear_alerts().await?;
    Ok(Json(StatusResponse::success()))
}
