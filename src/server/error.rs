//! Request-level errors and their HTTP mapping.
//!
//! Every component error ends up here. Stream routes answer with a short
//! plain-text message; the create API wraps the same mapping in a JSON
//! envelope via [`ApiError`].

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::proxy::ProxyError;
use crate::registry::RegistryError;
use crate::resolver::ResolveError;

/// Body for an unknown short name.
pub const NOT_FOUND_MESSAGE: &str = "404 - File Not Found in Database";
/// Body when the origin page could not be fetched.
pub const ORIGIN_UNREACHABLE_MESSAGE: &str = "Origin connection failed";
/// Body when the origin page has no download link.
pub const LINK_NOT_FOUND_MESSAGE: &str = "Original file removed or blocked by origin";
/// Body when the upstream file fetch fails.
pub const STREAM_ERROR_MESSAGE: &str = "Stream Error";
/// Body when credentials are missing or wrong.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Any failure a handler can report.
#[derive(Debug, Error)]
pub enum AppError {
    /// Registry failure (validation, duplicate, not found, store).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Origin page resolution failure.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Upstream file fetch failure.
    #[error(transparent)]
    Proxy(#[from] ProxyError),

    /// A required query or form field is missing or blank.
    #[error("missing required parameter '{name}'")]
    MissingParameter {
        /// Parameter name.
        name: &'static str,
    },

    /// The form body could not be read or decoded.
    #[error("invalid form body: {message}")]
    InvalidBody {
        /// Status chosen by the body extractor (400, 413, 415, 422).
        status: StatusCode,
        /// Extractor message.
        message: String,
    },

    /// Neither a valid session nor the correct password was presented.
    #[error("unauthorized")]
    Unauthorized,
}

impl AppError {
    /// Creates a missing-parameter error.
    #[must_use]
    pub fn missing_parameter(name: &'static str) -> Self {
        Self::MissingParameter { name }
    }

    /// Creates an invalid-body error.
    #[must_use]
    pub fn invalid_body(status: StatusCode, message: impl Into<String>) -> Self {
        Self::InvalidBody {
            status,
            message: message.into(),
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Registry(RegistryError::Validation { .. }) | Self::MissingParameter { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Registry(RegistryError::DuplicateName { .. }) => StatusCode::CONFLICT,
            Self::Registry(RegistryError::NotFound { .. })
            | Self::Resolve(ResolveError::LinkNotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Registry(RegistryError::Store(_)) | Self::Proxy(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Resolve(ResolveError::OriginUnreachable { .. }) => StatusCode::BAD_GATEWAY,
            Self::InvalidBody { status, .. } => *status,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message safe to show to clients. Internal details stay in the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Registry(RegistryError::Validation { message }) => message.clone(),
            Self::Registry(err @ RegistryError::DuplicateName { .. }) => err.to_string(),
            Self::Registry(RegistryError::NotFound { .. }) => NOT_FOUND_MESSAGE.to_string(),
            Self::Registry(RegistryError::Store(_)) => "Internal storage error".to_string(),
            Self::Resolve(ResolveError::OriginUnreachable { .. }) => {
                ORIGIN_UNREACHABLE_MESSAGE.to_string()
            }
            Self::Resolve(ResolveError::LinkNotFound { .. }) => LINK_NOT_FOUND_MESSAGE.to_string(),
            Self::Proxy(_) => STREAM_ERROR_MESSAGE.to_string(),
            Self::MissingParameter { .. } => self.to_string(),
            Self::InvalidBody { message, .. } => message.clone(),
            Self::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
        }
    }

    fn log(&self) {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), self.public_message()).into_response()
    }
}

/// JSON form of [`AppError`]: `{"success": false, "error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.log();
        let body = json!({ "success": false, "error": self.0.public_message() });
        (self.0.status(), Json(body)).into_response()
    }
}
