//! REST API handlers
//!
//! This module defines the routes and handlers of the shuffle server.

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::error::Error;
use crate::metrics;
use crate::models::ShuffleDocument;

use super::query::ShuffleQueryHandler;
use super::server::AppState;

/// Preflight cache lifetime advertised to browsers, in seconds
pub const CORS_MAX_AGE_SECS: &str = "3600";

// ============================================================================
// API Response Types
// ============================================================================

/// Simple error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Maps library errors to a generic 500; details stay in the logs
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self.0, "Returning internal server error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Internal server error")),
        )
            .into_response()
    }
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
///
/// The shuffle routes always carry the four CORS headers, on success,
/// on error, and on preflight.
pub fn create_router(state: AppState) -> Router {
    let shuffle_routes = Router::new()
        .route("/", get(get_shuffle).options(preflight))
        .route("/api/shuffle", get(get_shuffle).options(preflight))
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static("GET"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static("Content-Type"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_MAX_AGE,
                    HeaderValue::from_static(CORS_MAX_AGE_SECS),
                )),
        );

    Router::new()
        .route("/api/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .merge(shuffle_routes)
        .with_state(state)
}

// ============================================================================
// Shuffle Handlers
// ============================================================================

/// Latest shuffle, or the identity fallback when nothing is published
async fn get_shuffle(State(state): State<AppState>) -> Result<Json<ShuffleDocument>, ApiError> {
    let handler = ShuffleQueryHandler::new(state.store.clone());
    let document = handler.handle().await?;
    Ok(Json(document))
}

/// CORS preflight; headers are added by the router layer
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

// ============================================================================
// Health & Metrics Handlers
// ============================================================================

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Prometheus metrics endpoint
async fn metrics_handler() -> Response {
    match metrics::encode_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to encode metrics")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let response = ErrorResponse::new("test error");
        assert!(!response.success);
        assert_eq!(response.error, "test error");
    }

    #[test]
    fn test_api_error_is_500() {
        let response = ApiError::from(Error::store_unavailable("latest", "down")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
