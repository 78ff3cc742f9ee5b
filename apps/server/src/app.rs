// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Router and shared state.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use lightholder_processing::{Kernel, ModelService};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::routes;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ModelService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(kernel: Kernel, config: Config) -> Self {
        Self {
            service: Arc::new(ModelService::new(kernel)),
            config: Arc::new(config),
        }
    }
}

/// Build the router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    Router::new()
        // Root endpoint - API information
        .route("/", get(routes::health::info))
        // Health check
        .route("/api/v1/health", get(routes::health::check))
        // Model endpoints
        .route("/api/v1/params", get(routes::model::params))
        .route("/api/v1/mesh", post(routes::model::mesh))
        .route("/api/v1/stl", post(routes::model::stl))
        // Middleware
        .layer(DefaultBodyLimit::max(config.max_body_kb * 1024))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION])
}
