use crate::forms::FieldError;
use crate::store::StoreError;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;

/// Message shown to visitors and admins when the datastore cannot be reached.
pub const UPSTREAM_MESSAGE: &str = "Unable to reach the datastore. Please try again.";

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub fields: Vec<FieldError>,
}

impl AppError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "admin token required")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unprocessable(fields: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "please fix the highlighted fields".to_string(),
            fields,
        }
    }

    pub fn upstream() -> Self {
        Self::new(StatusCode::BAD_GATEWAY, UPSTREAM_MESSAGE)
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::not_found(format!("{what} not found")),
            other => {
                error!("datastore request failed: {other}");
                Self::upstream()
            }
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.fields.is_empty() {
            return (self.status, self.message).into_response();
        }

        let body = serde_json::json!({
            "error": self.message,
            "fields": self.fields,
        });
        (self.status, Json(body)).into_response()
    }
}
