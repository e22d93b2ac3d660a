//! Request-level errors and their HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// An error returned to the client as `{"error": message}`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request is missing a part or carries an unusable body.
    #[error("{0}")]
    InvalidRequest(String),

    /// The uploaded file is not a `.pptx`.
    #[error("Invalid file type. Please upload a .pptx file.")]
    InvalidFileType,

    /// No template has been uploaded yet.
    #[error("File not found")]
    NotFound,

    /// The template could not be loaded, filled or saved.
    #[error("An error occurred while processing the file: {0}")]
    Processing(String),

    /// The template could not be stored or read back.
    #[error("An error occurred while storing the file: {0}")]
    Storage(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::InvalidFileType => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Processing(_) | ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::warn!(%status, error = %self, "request rejected");
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
