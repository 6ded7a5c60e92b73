//! HTTP error response mapping.
//!
//! Validation failures are rendered as `{"<field>": ["<message>"]}`,
//! operational failures as `{"detail": "<message>"}`.

use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use freight_terminal_domain::error::{ConfigurationError, TerminalError};

/// JSON body for operational errors.
#[derive(Serialize)]
struct DetailBody {
    detail: String,
}

/// Maps [`TerminalError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(TerminalError);

impl ApiError {
    /// Error for a path segment that is not a valid identifier.
    #[must_use]
    pub fn invalid_id(field: &'static str) -> Self {
        Self(ConfigurationError::InvalidIdentifier { field }.into())
    }
}

impl From<TerminalError> for ApiError {
    fn from(err: TerminalError) -> Self {
        Self(err)
    }
}

fn field_error(field: &'static str, message: String) -> Response {
    let body: BTreeMap<&str, Vec<String>> = BTreeMap::from([(field, vec![message])]);
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn detail(status: StatusCode, message: String) -> Response {
    (status, Json(DetailBody { detail: message })).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            TerminalError::Configuration(err) => field_error(err.field(), err.to_string()),
            TerminalError::StateConflict(err) => field_error(err.field(), err.to_string()),
            TerminalError::OperationConflict(err) => {
                detail(StatusCode::BAD_REQUEST, err.to_string())
            }
            TerminalError::NotFound(err) => detail(StatusCode::NOT_FOUND, err.to_string()),
            TerminalError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                detail(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        }
    }
}
