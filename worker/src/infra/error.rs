use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use push_dispatcher::error::PushDispatcherError;
use serde_json::json;
use std::fmt;
use tracing::{error, info};

#[derive(Debug)]
pub struct AppError {
    pub status_code: StatusCode,
    pub cause: String,
    pub message: Option<String>,
}

impl AppError {
    pub fn new(
        cause: &str,
        message: &str,
    ) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, cause, message)
    }

    pub fn bad_request(
        cause: &str,
        message: &str,
    ) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, cause, message)
    }

    pub fn with_status(
        status_code: StatusCode,
        cause: &str,
        message: &str,
    ) -> Self {
        Self {
            status_code,
            cause: cause.to_string(),
            message: Some(message.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "cause": self.cause,
            "message": self.message,
        }));

        if self.status_code.is_server_error() {
            error!(self.cause);
        } else if self.status_code.is_client_error() {
            info!(self.cause);
        }

        (self.status_code, body).into_response()
    }
}

impl std::error::Error for AppError {}

impl fmt::Display for AppError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.cause)
    }
}

impl From<PushDispatcherError> for AppError {
    fn from(inner: PushDispatcherError) -> Self {
        Self {
            status_code: StatusCode::from_u16(inner.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            cause: inner.cause,
            message: inner.message,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(inner: JsonRejection) -> Self {
        Self {
            status_code: inner.status(),
            cause: inner.to_string(),
            message: Some(inner.body_text()),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(inner: PathRejection) -> Self {
        Self {
            status_code: inner.status(),
            cause: inner.to_string(),
            message: Some(inner.body_text()),
        }
    }
}
