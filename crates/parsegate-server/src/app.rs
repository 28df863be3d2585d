use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Specimens are taken from catch-all segments so a `/` inside a User-Agent
/// survives routing. The bare `/parse/ua` and `/parse/ip` forms exist so a
/// missing specimen still goes through the assembler and is counted.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/stats", get(routes::stats::get_stats))
        .route("/parse", get(routes::parse::parse_ua_ip))
        .route("/parse/ua", get(routes::parse::parse_ua))
        .route("/parse/ua/", get(routes::parse::parse_ua))
        .route("/parse/ua/{*ua}", get(routes::parse::parse_ua))
        .route("/parse/ua-v4", post(routes::parse::parse_ua_v4))
        .route("/parse/ip", get(routes::parse::parse_ip))
        .route("/parse/ip/", get(routes::parse::parse_ip))
        .route("/parse/ip/{*ip}", get(routes::parse::parse_ip))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Any origin when none are configured, otherwise the configured list.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}
