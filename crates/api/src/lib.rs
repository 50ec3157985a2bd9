pub mod app;
pub mod config;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod routes;
