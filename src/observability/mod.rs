//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registration, binding and dispatch produce:
//!     → tracing events (debug on registration/binding, warn on 4xx,
//!       error with handler name and cause chain on 5xx)
//!     → request spans from tower-http, tagged with x-request-id
//!
//! Consumers:
//!     → logging.rs subscriber (pretty or JSON to stdout)
//! ```

pub mod logging;

pub use logging::init as init_logging;
