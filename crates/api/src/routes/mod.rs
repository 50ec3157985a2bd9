//! HTTP route handlers.

pub mod alerts;
pub mod health;
pub mod snippets;
pub mod socket;
