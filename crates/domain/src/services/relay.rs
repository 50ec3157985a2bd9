//! Relay state: the alert store plus the connection and tracking registries.
//!
//! `Relay` is plain synchronous state. It is owned by exactly one task (the
//! gateway actor), which serialises every operation, so no locking happens
//! here. Operations return what has to be delivered and leave delivery to
//! the caller.

use serde_json::Value;
use tracing::debug;

use crate::models::{
    Alert, AlertKind, AlertSnapshot, ConnectionId, LocationUpdateRequest, Officer,
    OfficerLoginRequest, ResolveAlertRequest, StartTrackingRequest, TrackingUpdate,
};

use super::alert_store::{AlertStore, SubmittedAlert};
use super::officer_registry::OfficerRegistry;
use super::tracking_registry::TrackingRegistry;

/// What a disconnect cleaned up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemovedConnection {
    pub officer: Option<Officer>,
    pub tracking_sessions: usize,
}

/// Outcome of resolving an alert that names a known type.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOutcome {
    pub kind: AlertKind,
    /// The identifier exactly as the resolver sent it.
    pub id: Option<Value>,
    pub removed: usize,
}

#[derive(Debug, Default)]
pub struct Relay {
    alerts: AlertStore,
    officers: OfficerRegistry,
    tracking: TrackingRegistry,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> &AlertStore {
        &self.alerts
    }

    pub fn officers(&self) -> &OfficerRegistry {
        &self.officers
    }

    pub fn tracking(&self) -> &TrackingRegistry {
        &self.tracking
    }

    // ---------------------------------------------------------------------
    // Alerts
    // ---------------------------------------------------------------------

    pub fn submit_alert(&mut self, alert: Alert) -> SubmittedAlert {
        self.alerts.submit(alert)
    }

    /// `None` when the request names no known alert type; nothing is
    /// removed or announced in that case.
    pub fn resolve_alert(&mut self, request: &ResolveAlertRequest) -> Option<ResolvedOutcome> {
        let kind = request.kind()?;
        let removed = self.alerts.resolve(request.alert_id.as_ref(), kind);
        Some(ResolvedOutcome {
            kind,
            id: request.alert_id.clone(),
            removed,
        })
    }

    pub fn clear_alerts(&mut self) -> usize {
        self.alerts.clear()
    }

    // ---------------------------------------------------------------------
    // Officers and tracking
    // ---------------------------------------------------------------------

    /// Identifies the connection and returns the alert snapshot it is owed.
    pub fn login(&mut self, connection_id: ConnectionId, login: OfficerLoginRequest) -> AlertSnapshot {
        self.officers.register(connection_id, login);
        self.alerts.snapshot()
    }

    /// Records the new position and returns one update per session the
    /// officer is tracking. Unidentified connections get nothing.
    pub fn update_location(
        &mut self,
        connection_id: ConnectionId,
        location: LocationUpdateRequest,
    ) -> Vec<TrackingUpdate> {
        if !self.officers.update_location(
            &connection_id,
            location.lat.clone(),
            location.lng.clone(),
        ) {
            debug!(connection_id = %connection_id, "Location update from unidentified connection ignored");
            return Vec::new();
        }

        self.tracking
            .sessions_for(&connection_id)
            .map(|session| session.update_for(location.lat.clone(), location.lng.clone()))
            .collect()
    }

    /// Opens a tracking session and returns its initial update, pairing the
    /// officer's last known position with the alert's.
    pub fn start_tracking(
        &mut self,
        connection_id: ConnectionId,
        request: StartTrackingRequest,
    ) -> Option<TrackingUpdate> {
        let Some(officer) = self.officers.get(&connection_id) else {
            debug!(connection_id = %connection_id, "Tracking request from unidentified connection ignored");
            return None;
        };
        let (lat, lng) = (officer.lat.clone(), officer.lng.clone());

        let session = self.tracking.start(connection_id, request);
        Some(session.update_for(lat, lng))
    }

    pub fn stop_tracking(&mut self, connection_id: ConnectionId) -> usize {
        self.tracking.stop(&connection_id)
    }

    /// Forgets the connection and every tracking session it owned.
    pub fn remove_connection(&mut self, connection_id: ConnectionId) -> RemovedConnection {
        RemovedConnection {
            officer: self.officers.remove(&connection_id),
            tracking_sessions: self.tracking.stop(&connection_id),
        }
    }
}
