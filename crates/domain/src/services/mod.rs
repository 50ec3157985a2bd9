//! Domain services for the alert relay.
//!
//! Services hold the in-memory registries and the logic that operates on
//! domain models.

pub mod alert_store;
pub mod officer_registry;
pub mod relay;
pub mod tracking_registry;

pub use alert_store::{AlertStore, SubmittedAlert};
pub use officer_registry::OfficerRegistry;
pub use relay::{Relay, RemovedConnection, ResolvedOutcome};
pub use tracking_registry::TrackingRegistry;
