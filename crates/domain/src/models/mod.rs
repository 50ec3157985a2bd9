//! Domain models for the alert relay.

pub mod alert;
pub mod officer;
pub mod status;
pub mod tracking;

pub use alert::{
    Alert, AlertKind, AlertList, AlertSnapshot, ResolveAlertRequest, ResolvedAlert,
    SubmitAlertResponse, UnknownAlertKind,
};
pub use officer::{ConnectionId, LocationUpdateRequest, Officer, OfficerLoginRequest};
pub use status::StatusResponse;
pub use tracking::{
    StartTrackingRequest, StartTrackingResponse, TrackingData, TrackingId, TrackingSession,
    TrackingUpdate,
};
