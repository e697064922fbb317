//! Request dispatch pipeline.
//!
//! # Data Flow
//! ```text
//! RequestContext
//!     → binder.rs (declared params → Args)
//!     → invoker.rs (Args → handler → Reply)
//!     → serializer.rs (Reply + declared Returns → JSON)
//! ```
//!
//! # Design Decisions
//! - Each stage returns `RouteError` and never builds a response itself
//! - Signatures are plain data built at registration, not inspected per request

pub mod binder;
pub mod invoker;
pub mod serializer;
pub mod signature;

pub use binder::{bind, Arg, Args};
pub use invoker::{invoke, Handler};
pub use serializer::{serialize, Shape};
pub use signature::{Param, ParamKind, Returns, Signature, CONTEXT_PARAM};
