use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::warn;

use crate::downloader::ExtractionExhausted;
use crate::search::SearchError;

/// Every handler failure ends up here and leaves as `{"error": "..."}`
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or empty required field, malformed body
    #[error("{0}")]
    InvalidInput(String),

    /// Every extraction strategy failed
    #[error("{0}")]
    ExtractionExhausted(#[from] ExtractionExhausted),

    /// Anything else a collaborator threw; surfaced verbatim
    #[error("{0}")]
    CollaboratorFailure(String),

    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ExtractionExhausted(_) | Self::CollaboratorFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        Self::CollaboratorFailure(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("[Api] {}: {}", status, self);
        }
        let body = serde_json::json!({
            "error": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
