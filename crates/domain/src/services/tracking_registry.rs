//! Tracking registry: active officer-to-alert tracking sessions.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{ConnectionId, StartTrackingRequest, TrackingId, TrackingSession};

/// Sessions are kept in start order so fan-out is deterministic.
#[derive(Debug, Default)]
pub struct TrackingRegistry {
    sessions: Vec<TrackingSession>,
}

impl TrackingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(
        &mut self,
        officer_connection_id: ConnectionId,
        request: StartTrackingRequest,
    ) -> &TrackingSession {
        self.start_at(officer_connection_id, request, Utc::now())
    }

    pub fn start_at(
        &mut self,
        officer_connection_id: ConnectionId,
        request: StartTrackingRequest,
        now: DateTime<Utc>,
    ) -> &TrackingSession {
        let index = self.sessions.len();
        self.sessions.push(TrackingSession {
            tracking_id: Uuid::new_v4(),
            alert_id: request.alert_id,
            alert_type: request.alert_type,
            alert_lat: request.alert_lat,
            alert_lng: request.alert_lng,
            officer_connection_id,
            start_time: now,
        });
        &self.sessions[index]
    }

    /// Drops every session owned by the connection; returns how many.
    pub fn stop(&mut self, officer_connection_id: &ConnectionId) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|s| s.officer_connection_id != *officer_connection_id);
        before - self.sessions.len()
    }

    pub fn sessions_for<'a>(
        &'a self,
        officer_connection_id: &'a ConnectionId,
    ) -> impl Iterator<Item = &'a TrackingSession> + 'a {
        self.sessions
            .iter()
            .filter(move |s| s.officer_connection_id == *officer_connection_id)
    }

    pub fn get(&self, tracking_id: &TrackingId) -> Option<&TrackingSession> {
        self.sessions.iter().find(|s| s.tracking_id == *tracking_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
