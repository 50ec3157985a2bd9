//! In-memory alert store.
//!
//! Keeps camera and SOS alerts in two insertion-ordered lists. Alerts with
//! an unrecognized `type` are acknowledged but never stored.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::{Alert, AlertKind, AlertSnapshot};

/// Outcome of [`AlertStore::submit`].
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedAlert {
    /// Effective identifier, as stored in the alert.
    pub id: Value,
    /// List the alert landed in, `None` when it was not stored.
    pub kind: Option<AlertKind>,
    /// The stamped alert as stored (and as it should be broadcast).
    pub alert: Alert,
}

#[derive(Debug, Clone, Default)]
pub struct AlertStore {
    camera: Vec<Alert>,
    sos: Vec<Alert>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, alert: Alert) -> SubmittedAlert {
        self.submit_at(alert, Utc::now())
    }

    /// Stamps `id`/`time` if missing and appends to the matching list.
    pub fn submit_at(&mut self, mut alert: Alert, now: DateTime<Utc>) -> SubmittedAlert {
        let id = alert.stamp(now);
        let kind = alert.kind();

        if let Some(kind) = kind {
            self.list_mut(kind).push(alert.clone());
        }

        SubmittedAlert { id, kind, alert }
    }

    /// Removes every alert of `kind` whose identifier equals `id`. The
    /// comparison is on raw JSON values, so `"42"` does not match `42`.
    ///
    /// Returns the number of removed alerts; zero is not an error.
    pub fn resolve(&mut self, id: Option<&Value>, kind: AlertKind) -> usize {
        let Some(id) = id else {
            return 0;
        };

        let list = self.list_mut(kind);
        let before = list.len();
        list.retain(|alert| !alert.has_id(id));
        before - list.len()
    }

    /// Empties both lists and returns how many alerts were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.len();
        self.camera.clear();
        self.sos.clear();
        dropped
    }

    pub fn list(&self, kind: AlertKind) -> &[Alert] {
        match kind {
            AlertKind::Camera => &self.camera,
            AlertKind::Sos => &self.sos,
        }
    }

    pub fn camera(&self) -> &[Alert] {
        &self.camera
    }

    pub fn sos(&self) -> &[Alert] {
        &self.sos
    }

    /// Point-in-time copy of both lists.
    pub fn snapshot(&self) -> AlertSnapshot {
        AlertSnapshot::new(self.camera.clone(), self.sos.clone())
    }

    pub fn len(&self) -> usize {
        self.camera.len() + self.sos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn list_mut(&mut self, kind: AlertKind) -> &mut Vec<Alert> {
        match kind {
            AlertKind::Camera => &mut self.camera,
            AlertKind::Sos => &mut self.sos,
        }
    }
}
