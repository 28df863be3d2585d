use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use parsegate_core::assemble::Outcome;

/// Application-level errors that map directly to HTTP responses.
///
/// Error bodies are plain text, never a structured document; most are empty.
#[derive(Debug, Error)]
pub enum AppError {
    /// No usable input, a rejected specimen or an unresolvable host.
    #[error("bad request")]
    BadRequest(Option<String>),

    /// The `Accept` header admits none of the endpoint's representations.
    #[error("not acceptable")]
    NotAcceptable,

    /// Details were logged where the failure was classified.
    #[error("internal error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(Some(message)) => (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                message,
            )
                .into_response(),
            AppError::BadRequest(None) => StatusCode::BAD_REQUEST.into_response(),
            AppError::NotAcceptable => StatusCode::NOT_ACCEPTABLE.into_response(),
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Collapse an assembler outcome into a handler result.
pub fn into_result<T>(outcome: Outcome<T>) -> Result<T, AppError> {
    match outcome {
        Outcome::Success(value) => Ok(value),
        Outcome::ValidationFailure(message) => Err(AppError::BadRequest(message)),
        Outcome::InternalFailure => Err(AppError::Internal),
    }
}
