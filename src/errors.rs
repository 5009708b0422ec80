use anyhow::Error;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures the domain knows how to name. Anything else (database errors,
/// constraint violations) travels as a plain `anyhow::Error`.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("property {0} not found")]
    PropertyNotFound(i32),
}

impl From<JsonRejection> for LedgerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

#[derive(Debug)]
pub struct ServerError {
    err: Error,
    message: &'static str,
}

impl ServerError {
    /// Replace the generic public message with one naming the operation
    /// that failed, i.e, "Failed to create property".
    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = message;
        self
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self.err.downcast_ref::<LedgerError>() {
            Some(LedgerError::PropertyNotFound(_)) => {
                (StatusCode::NOT_FOUND, "Property not found")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, self.message),
        };
        if status.is_server_error() {
            tracing::error!(error = ?self.err, "{message}");
        } else {
            tracing::info!(error = %self.err, "{message}");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

// This enables using `?` on functions that return `Result<_, anyhow::Error>`
// to turn them into `Result<_, ServerError>`. That way you don't need to do
// that manually.
impl<E> From<E> for ServerError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            err: err.into(),
            message: "Something went wrong",
        }
    }
}

/// Attach an operation-specific public message to any failure.
pub trait OrFail<T> {
    fn or_fail(self, message: &'static str) -> Result<T, ServerError>;
}

impl<T, E> OrFail<T> for Result<T, E>
where
    E: Into<ServerError>,
{
    fn or_fail(self, message: &'static str) -> Result<T, ServerError> {
        self.map_err(|e| e.into().with_message(message))
    }
}
