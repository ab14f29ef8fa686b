//! HTTP handlers for the dashboard page and JSON API
//!
//! Each request is one render cycle over the cached dataset.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, warn};

use super::page;
use super::service::DashboardService;
use crate::dashboard::Dashboard;
use crate::error::DataError;
use crate::filter::Selection;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub data_path: String,
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Raw query pairs; `state` may repeat.
pub type QueryPairs = Query<Vec<(String, String)>>;

pub type AppState = Arc<DashboardService>;

// ============================================================================
// Errors
// ============================================================================

fn error_status(e: &DataError) -> StatusCode {
    if e.is_missing_file() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn log_error(e: &DataError) {
    if e.is_missing_file() {
        warn!("{}", e);
    } else {
        error!("Dashboard render failed: {}", e);
    }
}

fn json_error(e: DataError) -> (StatusCode, Json<ErrorResponse>) {
    log_error(&e);
    (error_status(&e), Json(ErrorResponse { error: e.to_string() }))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
pub async fn index(State(service): State<AppState>, Query(params): QueryPairs) -> Response {
    let selection = Selection::from_query(&params);
    match service.dashboard(&selection).await {
        Ok(dashboard) => Html(page::render_dashboard(&dashboard)).into_response(),
        Err(e) => {
            log_error(&e);
            (error_status(&e), Html(page::render_error(&e))).into_response()
        }
    }
}

/// GET /api/v1/health
pub async fn health(State(service): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        data_path: service.data_path().display().to_string(),
    })
}

/// GET /api/v1/states
pub async fn get_states(
    State(service): State<AppState>,
) -> Result<Json<Vec<String>>, (StatusCode, Json<ErrorResponse>)> {
    service.states().await.map(Json).map_err(json_error)
}

/// GET /api/v1/dashboard
pub async fn get_dashboard(
    State(service): State<AppState>,
    Query(params): QueryPairs,
) -> Result<Json<Dashboard>, (StatusCode, Json<ErrorResponse>)> {
    let selection = Selection::from_query(&params);
    service.dashboard(&selection).await.map(Json).map_err(json_error)
}

/// GET /api/v1/charts/:id.svg
pub async fn get_chart(
    State(service): State<AppState>,
    Path(file): Path<String>,
    Query(params): QueryPairs,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Chart not found: {}", file),
            }),
        )
    };

    let id = file.strip_suffix(".svg").ok_or_else(not_found)?;
    let selection = Selection::from_query(&params);
    let dashboard = service.dashboard(&selection).await.map_err(json_error)?;
    let chart = dashboard.chart(id).ok_or_else(not_found)?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], chart.to_svg()).into_response())
}
