// HTTP API Error Types
use axum::{
    extract::rejection::{BytesRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::database::{DatabaseError, RepositoryError};
use crate::schema::{SchemaFetchError, SchemaValidationError};

/// HTTP API error. The message is for the logs only; responses carry the
/// status code and an empty body.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    /// Map an extractor rejection onto the taxonomy, dropping axum's text body
    fn from_rejection(status: StatusCode, detail: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => ApiError::bad_request(detail),
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::payload_too_large(detail),
            _ => ApiError::internal_server_error(detail),
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::internal_server_error(format!("database error: {}", err))
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Database(e) => e.into(),
            // Stored documents failing to decode is a data integrity problem, never the caller's
            RepositoryError::Decode { .. } => ApiError::internal_server_error(err.to_string()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::from_rejection(rejection.status(), format!("path rejected: {}", rejection.body_text()))
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::from_rejection(rejection.status(), format!("body rejected: {}", rejection.body_text()))
    }
}

impl From<SchemaFetchError> for ApiError {
    fn from(err: SchemaFetchError) -> Self {
        ApiError::internal_server_error(format!("schema unavailable: {}", err))
    }
}

impl From<SchemaValidationError> for ApiError {
    fn from(err: SchemaValidationError) -> Self {
        match err {
            SchemaValidationError::InvalidSchema(msg) => {
                ApiError::internal_server_error(format!("invalid JSON Schema: {}", msg))
            }
            SchemaValidationError::Rejected(errors) => {
                ApiError::bad_request(format!("content rejected by schema: {}", errors.join("; ")))
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self.message());
        } else {
            tracing::warn!(status = status.as_u16(), "{}", self.message());
        }
        status.into_response()
    }
}
