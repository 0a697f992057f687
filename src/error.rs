use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the tracking core and its HTTP handlers.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad caller input: limits, malformed dates, write-contract violations.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unknown timezone: {0}")]
    InvalidTimezone(String),

    /// Backing store unreachable or the query failed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    #[error("store call timed out")]
    StoreTimeout,

    /// A best-effort enrichment service (LLM estimation, tips) failed.
    #[error("external service degraded: {0}")]
    ExternalServiceDegraded(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// True for failures that degrade a single metric instead of the request.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Error::StoreUnavailable(_) | Error::StoreTimeout)
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_) | Error::InvalidTimezone(_) => StatusCode::BAD_REQUEST,
            Error::StoreUnavailable(_) | Error::StoreTimeout => StatusCode::SERVICE_UNAVAILABLE,
            Error::ExternalServiceDegraded(_) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
