// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plant Light Holder Server - builds the parametric model on request.
//!
//! # Endpoints
//!
//! - `GET /api/v1/health` - Health check
//! - `GET /api/v1/params` - Defaults, ranges and last-used parameters
//! - `POST /api/v1/mesh` - Build and return the render mesh (JSON)
//! - `POST /api/v1/stl` - Build and download binary STL

use std::net::SocketAddr;

use anyhow::Context;
use lightholder_processing::Kernel;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod error;
mod routes;
mod types;

use app::AppState;
use config::{Config, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(config.log_format);

    tracing::info!(
        port = config.port,
        request_timeout_secs = config.request_timeout_secs,
        max_body_kb = config.max_body_kb,
        cors_origins = ?config.cors_origins,
        "Starting Plant Light Holder Server"
    );

    let kernel = Kernel::init()
        .await
        .context("geometry kernel failed its self-check")?;
    let state = AppState::new(kernel, config.clone());
    let app = app::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,lightholder_server=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}
