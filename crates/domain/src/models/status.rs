//! Generic status acknowledgement.

use serde::{Deserialize, Serialize};

/// `{"status": "..."}` body used by write endpoints and acks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}
