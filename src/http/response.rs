//! Response construction.
//!
//! # Responsibilities
//! - Wrap serialized handler output with the route's success status
//! - Map `RouteError` to status codes and JSON error bodies
//!
//! # Error bodies
//! - 404 `{"error": message}`
//! - 422 `{"errors": [{"loc": [...], "msg": ...}, ...]}` for validation
//! - 422 `{"error": message}` for a return-type mismatch
//! - 413 `{"error": message}` for a body over the configured limit
//! - 500 `{"error": "Internal Server Error", "details": message}`

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::error::RouteError;

/// Client-facing message for unhandled faults.
pub const INTERNAL_ERROR: &str = "Internal Server Error";

/// A successful JSON response.
pub fn json_response(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

impl RouteError {
    /// Status code this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            RouteError::NotFound(_) => StatusCode::NOT_FOUND,
            RouteError::Validation(_) | RouteError::TypeMismatch(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            RouteError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RouteError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body this error is reported with.
    pub fn body(&self) -> Value {
        match self {
            RouteError::NotFound(msg) | RouteError::TypeMismatch(msg) => json!({ "error": msg }),
            RouteError::Validation(errors) => json!({ "errors": errors }),
            RouteError::PayloadTooLarge(_) => json!({ "error": self.to_string() }),
            RouteError::Internal(e) => json!({ "error": INTERNAL_ERROR, "details": e.to_string() }),
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        json_response(self.status(), self.body())
    }
}
