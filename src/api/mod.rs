//! HTTP interface for the shipment dashboard
//!
//! Serves the HTML page and a small JSON API over the same service.

pub mod handlers;
pub mod page;
pub mod service;

pub use service::DashboardService;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_router(service: Arc<DashboardService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Page
        .route("/", get(handlers::index))
        // JSON API
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/states", get(handlers::get_states))
        .route("/api/v1/dashboard", get(handlers::get_dashboard))
        .route("/api/v1/charts/:file", get(handlers::get_chart))
        // State and middleware
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
