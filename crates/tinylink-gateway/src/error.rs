use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tinylink_core::ShortenerError;
use tracing::{error, warn};

pub type Result<T> = std::result::Result<T, AppError>;

const NOT_FOUND_MESSAGE: &str = "short URL not found";

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Debug, Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
}

#[derive(Debug)]
pub enum AppError {
    /// The request was malformed before it reached the shortener.
    Validation(String),
    /// Nothing to act on for the given code.
    NotFound,
    Shortener(ShortenerError),
}

impl From<ShortenerError> for AppError {
    fn from(value: ShortenerError) -> Self {
        Self::Shortener(value)
    }
}

impl AppError {
    fn parts(self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, "invalid_input", message),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                NOT_FOUND_MESSAGE.to_string(),
            ),
            AppError::Shortener(err) => match err {
                ShortenerError::InvalidInput(message) => {
                    (StatusCode::BAD_REQUEST, "invalid_input", message)
                }
                ShortenerError::AliasConflict(alias) => (
                    StatusCode::CONFLICT,
                    "alias_conflict",
                    format!("alias '{alias}' is already in use"),
                ),
                ShortenerError::DuplicateCode(code) => (
                    StatusCode::CONFLICT,
                    "duplicate_code",
                    format!("short code '{code}' was taken concurrently, retry the request"),
                ),
                // Expired codes look exactly like unknown ones from outside.
                ShortenerError::NotFound(_) | ShortenerError::Expired(_) => (
                    StatusCode::NOT_FOUND,
                    "not_found",
                    NOT_FOUND_MESSAGE.to_string(),
                ),
                err @ ShortenerError::GenerationExhausted { .. } => {
                    warn!(error = %err, "request failed");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "generation_exhausted",
                        "could not allocate a short code, retry the request".to_string(),
                    )
                }
                err @ ShortenerError::StoreUnavailable(_) => {
                    error!(error = %err, "request failed");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "store_unavailable",
                        "storage is temporarily unavailable".to_string(),
                    )
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = ErrorBody {
            error: ErrorInfo { code, message },
        };
        (status, Json(body)).into_response()
    }
}
