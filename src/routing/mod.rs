//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     router.get(path) / .post(path) / ...
//!     → path.rs (prefix join, slash normalization)
//!     → router.rs (RouteEntry appended with cached Signature)
//!
//! Composition:
//!     router.include(&other) → entries appended in order
//!
//! Compilation:
//!     RouteEntry[]
//!     → Endpoint per entry (bind → invoke → serialize → respond)
//!     → axum::Router (first registration wins per path + method)
//! ```
//!
//! # Design Decisions
//! - Routes are assembled at startup and read-only while serving
//! - Registration order is the compiled order

pub mod path;
pub mod router;

pub use path::normalize;
pub use router::{CompiledRoute, RouteBuilder, RouteEntry, Router, DEFAULT_BODY_LIMIT};
