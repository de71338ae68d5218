//! The guest server's uniform error envelope: every handler that fails
//! returns `{"status": "error", "message": <string>}` with an appropriate
//! status code (§4.1 Contract).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    /// Malformed or unacceptable request payload -- 400.
    BadRequest(String),
    /// The requested resource (file, window, setter tag) doesn't exist -- 404.
    NotFound(String),
    /// A single-flight resource is already held (e.g. a recording already
    /// running) -- 409.
    Conflict(String),
    /// Everything else: I/O faults, subprocess failures, executed-code
    /// exceptions -- 500.
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "bad request: {msg}"),
            AppError::NotFound(msg) => write!(f, "not found: {msg}"),
            AppError::Conflict(msg) => write!(f, "conflict: {msg}"),
            AppError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = self.to_string();
        (status, Json(json!({ "status": "error", "message": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
