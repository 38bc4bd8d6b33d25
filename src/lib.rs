//! # University Records
//!
//! A small server-rendered records application for a university: students, professors,
//! courses, enrollments and tuition payments with add/edit/delete forms, CSV export and
//! import per record type, and an image gallery with upload and download.
//!
//! ## Architecture
//!
//! - **Axum**: HTTP server, routing, form and multipart extraction
//! - **SQLx**: SQLite storage through a shared pool, one transaction per request
//! - **Handlebars**: HTML templates compiled into the binary
//! - **Tokio**: async runtime and file I/O for gallery uploads
//!
//! ## Core Components
//!
//! - [`config`]: layered configuration (embedded defaults, file, environment)
//! - [`db`]: schema initialization
//! - [`store`]: record persistence and the sequential id allocator
//! - [`forms`]: form payloads and their validation rules
//! - [`csv`] and [`transfer`]: CSV encoding and per-record column mappings
//! - [`gallery`]: category directories under the uploads root
//! - [`views`]: page models and template rendering
//! - [`routes`]: HTTP handlers
//! - [`middleware`]: request validation and security headers
//! - [`error`]: the application error type and its HTTP mapping
//! - [`metrics`]: activity counters

pub mod config;
pub mod csv;
pub mod db;
pub mod error;
pub mod forms;
pub mod gallery;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;
pub mod transfer;
pub mod types;
pub mod views;

#[cfg(test)]
mod tests;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    response::Redirect,
    routing::get,
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use state::AppState;

/// Builds the complete application router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();
    let uploads = ServeDir::new(state.uploads_root());

    let app = Router::new()
        .route("/", get(|| async { Redirect::to("/university") }))
        .nest("/university", routes::university_router())
        .route("/healthz", get(routes::health::healthz))
        .route("/readyz", get(routes::health::readyz))
        .route("/metrics", get(routes::health::metrics))
        .route("/metrics/prometheus", get(routes::health::metrics_prometheus))
        .route("/version", get(routes::health::version))
        .nest_service("/static/uploads", uploads)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes))
        .layer(from_fn_with_state(config.clone(), middleware::validation::validate_request_middleware))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(config, middleware::security_headers::security_headers_middleware));

    // Permissive CORS only for local development builds
    if cfg!(debug_assertions) {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}
