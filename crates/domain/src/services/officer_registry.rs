//! Connection registry: which connections have identified as officers.

use std::collections::HashMap;

use serde_json::Value;

use crate::models::{ConnectionId, Officer, OfficerLoginRequest};

#[derive(Debug, Default)]
pub struct OfficerRegistry {
    officers: HashMap<ConnectionId, Officer>,
}

impl OfficerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts the officer record; returns the record it replaced, if any.
    pub fn register(
        &mut self,
        connection_id: ConnectionId,
        login: OfficerLoginRequest,
    ) -> Option<Officer> {
        self.officers
            .insert(connection_id, Officer::from_login(connection_id, login))
    }

    /// Returns `false` when the connection never logged in.
    pub fn update_location(
        &mut self,
        connection_id: &ConnectionId,
        lat: Option<Value>,
        lng: Option<Value>,
    ) -> bool {
        match self.officers.get_mut(connection_id) {
            Some(officer) => {
                officer.lat = lat;
                officer.lng = lng;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&Officer> {
        self.officers.get(connection_id)
    }

    pub fn is_identified(&self, connection_id: &ConnectionId) -> bool {
        self.officers.contains_key(connection_id)
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<Officer> {
        self.officers.remove(connection_id)
    }

    pub fn len(&self) -> usize {
        self.officers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.officers.is_empty()
    }
}
