//! Domain layer for the alert relay.
//!
//! This crate contains:
//! - Domain models (Alert, Officer, TrackingSession) and wire payloads
//! - The in-memory registries and the `Relay` that owns them

pub mod models;
pub mod services;
