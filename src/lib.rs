//! Typed request binding and JSON dispatch for axum.
//!
//! Handlers are registered against a path and method together with a
//! declared signature. Each request is bound into keyword arguments, the
//! handler is invoked, and its reply is serialized according to the declared
//! return type, with validation models and records handled specially.
//!
//! ```rust,ignore
//! use bindroute::{Args, Reply, Returns, RouteResult, Router};
//!
//! async fn list_articles(args: Args) -> RouteResult<Reply> {
//!     let limit = args.str("limit");
//!     Ok(Reply::cursor(Article::query(limit)))
//! }
//!
//! let mut router = Router::with_prefix("/articles");
//! router
//!     .get("/")
//!     .param("limit")
//!     .returns(Returns::list_of_records::<Article>())
//!     .to(list_articles);
//!
//! let app: axum::Router = router.into_axum();
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod model;
pub mod observability;
pub mod routing;

pub use config::AppConfig;
pub use dispatch::{Args, Handler, Param, Returns, Signature};
pub use error::{FieldError, RouteError, RouteResult, ValidationErrors};
pub use http::{App, RequestContext};
pub use model::{FieldValue, QuerySet, Record, Reply, Schema};
pub use routing::Router;
