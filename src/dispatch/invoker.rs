//! Handler invocation.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::dispatch::binder::Args;
use crate::error::RouteResult;
use crate::model::Reply;

type AsyncFn = dyn Fn(Args) -> BoxFuture<'static, RouteResult<Reply>> + Send + Sync;
type SyncFn = dyn Fn(Args) -> RouteResult<Reply> + Send + Sync;

#[derive(Clone)]
enum Kind {
    Async(Arc<AsyncFn>),
    Sync(Arc<SyncFn>),
}

/// A type-erased route handler. Cloning shares the underlying function.
#[derive(Clone)]
pub struct Handler {
    name: &'static str,
    kind: Kind,
}

impl Handler {
    /// Wrap an async handler.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RouteResult<Reply>> + Send + 'static,
    {
        Self {
            name: std::any::type_name::<F>(),
            kind: Kind::Async(Arc::new(move |args| f(args).boxed())),
        }
    }

    /// Wrap a handler that returns immediately.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(Args) -> RouteResult<Reply> + Send + Sync + 'static,
    {
        Self {
            name: std::any::type_name::<F>(),
            kind: Kind::Sync(Arc::new(f)),
        }
    }

    /// Diagnostic name of the wrapped function.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether two handles share the same function.
    pub fn same_as(&self, other: &Handler) -> bool {
        match (&self.kind, &other.kind) {
            (Kind::Async(a), Kind::Async(b)) => Arc::ptr_eq(a, b),
            (Kind::Sync(a), Kind::Sync(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Call the handler with bound arguments and wait for its result.
    pub async fn call(&self, args: Args) -> RouteResult<Reply> {
        invoke(self, args).await
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.name).finish()
    }
}

/// Run `handler`, resolving sync and async handlers the same way.
///
/// Errors returned by the handler pass through untouched.
pub async fn invoke(handler: &Handler, args: Args) -> RouteResult<Reply> {
    match &handler.kind {
        Kind::Async(f) => f(args).await,
        Kind::Sync(f) => f(args),
    }
}
