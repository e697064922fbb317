//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! axum request
//!     → server.rs (request ID, trace span, prefix mount)
//!     → endpoint.rs (per-route adapter)
//!         → request.rs (RequestContext: query, lazily parsed body)
//!         → dispatch pipeline
//!         → response.rs (JSON body + status, or mapped error)
//!     → client
//! ```

pub mod endpoint;
pub mod request;
pub mod response;
pub mod server;

pub use endpoint::Endpoint;
pub use request::RequestContext;
pub use server::{App, UuidRequestId, X_REQUEST_ID};
