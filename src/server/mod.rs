//! HTTP surface of the repository.
//!
//! A thin axum layer: handlers validate inputs, call into the service,
//! and map [`RepoError`] kinds onto status codes. No repository logic
//! lives here.

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::AllowedMethods;
use crate::error::{RepoError, Result};
use crate::service::RepoService;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RepoService>,
    pub allowed_methods: AllowedMethods,
}

/// Build the application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/bom",
            get(handlers::get_bom)
                .post(handlers::post_bom)
                .delete(handlers::delete_bom),
        )
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until `shutdown` resolves.
pub async fn serve(
    addr: SocketAddr,
    state: AppState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| RepoError::config(format!("cannot bind {addr}: {e}")))?;
    info!(addr = %addr, "BOM repository server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(RepoError::from)
}

/// Which side of the format matrix a negotiation error came from; decides
/// between `406 Not Acceptable` (serving) and `415 Unsupported Media Type`
/// (ingest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Serve,
    Ingest,
}

/// A [`RepoError`] annotated with the request phase it occurred in.
#[derive(Debug)]
pub(crate) struct ApiError {
    error: RepoError,
    phase: Phase,
}

impl ApiError {
    pub(crate) fn serve(error: RepoError) -> Self {
        Self {
            error,
            phase: Phase::Serve,
        }
    }

    pub(crate) fn ingest(error: RepoError) -> Self {
        Self {
            error,
            phase: Phase::Ingest,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self.error {
            RepoError::InvalidSerialNumber { .. } => {
                (StatusCode::BAD_REQUEST, "invalid_serial_number")
            }
            RepoError::InvalidVersion { .. } => (StatusCode::BAD_REQUEST, "invalid_version"),
            RepoError::Decode { .. } => (StatusCode::BAD_REQUEST, "decode_failure"),
            RepoError::UnsupportedFormatVersion(_) => match self.phase {
                Phase::Ingest => (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "unsupported_format_version",
                ),
                Phase::Serve => (StatusCode::NOT_ACCEPTABLE, "unsupported_format_version"),
            },
            RepoError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            RepoError::AlreadyExists { .. } => (StatusCode::CONFLICT, "already_exists"),
            RepoError::MethodNotAllowed { allowed } => {
                let body = Json(serde_json::json!({
                    "error": "method_not_allowed",
                    "message": "method disabled by configuration",
                }));
                return (
                    StatusCode::METHOD_NOT_ALLOWED,
                    [(header::ALLOW, allowed.clone())],
                    body,
                )
                    .into_response();
            }
            RepoError::Storage { .. } | RepoError::Config(_) => {
                // Internal detail stays in the log, not the response
                error!(error = %self.error, "internal error while handling request");
                let body = Json(serde_json::json!({
                    "error": "storage_failure",
                    "message": "internal storage error",
                }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
        };

        let body = Json(serde_json::json!({
            "error": kind,
            "message": self.error.to_string(),
        }));
        (status, body).into_response()
    }
}
