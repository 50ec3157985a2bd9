use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::gateway::GatewayHandle;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{alerts, health, snippets, socket};

#[derive(Clone)]
pub struct AppState {
    pub gateway: GatewayHandle,
    pub config: Arc<Config>,
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(config: Config, gateway: GatewayHandle) -> Router {
    let config = Arc::new(config);
    let cors = cors_layer(&config);

    let state = AppState {
        gateway,
        config: config.clone(),
    };

    // Alert producers and dashboards
    let alert_routes = Router::new()
        .route("/send-alert", post(alerts::send_alert))
        .route("/alerts", get(alerts::get_alerts))
        .route("/alerts/camera", get(alerts::get_camera_alerts))
        .route("/alerts/sos", get(alerts::get_sos_alerts))
        .route("/resolve-alert", post(alerts::resolve_alert))
        .route("/clear-alerts", post(alerts::clear_alerts))
        .route("/snippets/:filename", get(snippets::get_snippet));

    // Officer clients
    let socket_routes = Router::new().route("/ws", get(socket::ws_handler));

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(alert_routes)
        .merge(socket_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
