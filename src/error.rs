//! Error taxonomy for the dispatch pipeline.
//!
//! # Responsibilities
//! - Define the errors raised by binding, invocation and serialization
//! - Carry per-field validation detail for 422 responses
//!
//! # Design Decisions
//! - Binder, invoker and serializer only return `RouteError`; conversion to a
//!   response happens once, in the endpoint adapter (`http::response`)
//! - Unhandled faults wrap `anyhow::Error` so the full cause chain is logged

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result alias used by handlers and the pipeline stages.
pub type RouteResult<T> = Result<T, RouteError>;

/// Errors surfaced while serving a routed request.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The handler could not find the requested resource.
    #[error("{0}")]
    NotFound(String),

    /// A validation model rejected its input, on the way in or out.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The handler's value does not match its declared return type.
    #[error("{0}")]
    TypeMismatch(String),

    /// The request body is larger than the configured limit, in bytes.
    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// Anything else. Reported to the client as a generic 500.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl RouteError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::TypeMismatch(msg.into())
    }

    pub fn internal(msg: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Internal(anyhow::Error::msg(msg))
    }
}

impl From<ValidationErrors> for RouteError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Path to the offending field. Empty when the failure concerns the whole value.
    pub loc: Vec<String>,
    pub msg: String,
}

impl FieldError {
    pub fn new(loc: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            loc: vec![loc.into()],
            msg: msg.into(),
        }
    }

    /// A failure not attributable to any one field.
    pub fn root(msg: impl Into<String>) -> Self {
        Self {
            loc: Vec::new(),
            msg: msg.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "field required")
    }
}

/// Collected validation failures for one model construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Builder-style push.
    pub fn with(mut self, error: FieldError) -> Self {
        self.0.push(error);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Convert a serde deserialization failure into a field error.
    ///
    /// serde_json does not report a path for `from_value`, so the field is
    /// recovered from the message when serde names one.
    pub fn from_serde(err: &serde_json::Error) -> Self {
        let msg = err.to_string();
        let error = match quoted_field(&msg) {
            Some(field) if msg.starts_with("missing field") => FieldError::missing(field),
            Some(field) => FieldError::new(field, msg.clone()),
            None => FieldError::root(msg),
        };
        Self(vec![error])
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if err.loc.is_empty() {
                write!(f, "{}", err.msg)?;
            } else {
                write!(f, "{}: {}", err.loc.join("."), err.msg)?;
            }
        }
        Ok(())
    }
}

// serde formats field names as `name` in its messages.
fn quoted_field(msg: &str) -> Option<&str> {
    let field_kinds = ["missing field `", "unknown field `", "duplicate field `"];
    field_kinds.iter().find_map(|prefix| {
        let start = msg.find(prefix)? + prefix.len();
        let len = msg[start..].find('`')?;
        Some(&msg[start..start + len])
    })
}
