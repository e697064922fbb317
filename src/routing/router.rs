//! Route registry.
//!
//! # Responsibilities
//! - Record (path, method, handler, status, signature) entries in order
//! - Merge other registries' entries
//! - Compile entries into endpoints and into an axum route table
//!
//! # Design Decisions
//! - Status code and signature live on the entry, never on the handler
//! - Merging copies entries; handlers stay shared behind `Arc`
//! - Duplicate (path, method): first registered wins when mounted. Paths
//!   that differ only in capture names count as the same path

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::routing::{MethodFilter, MethodRouter};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use crate::dispatch::{Args, Handler, Param, Returns, Signature, CONTEXT_PARAM};
use crate::error::RouteResult;
use crate::http::endpoint::Endpoint;
use crate::model::{Reply, Schema};
use crate::routing::path::normalize;

/// Default cap on request bodies read by compiled endpoints.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// One registered route.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub path: String,
    pub method: Method,
    pub handler: Handler,
    pub status: StatusCode,
    pub signature: Arc<Signature>,
}

/// A compiled route ready for a host route table.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    pub path: String,
    pub method: Method,
    pub endpoint: Endpoint,
}

/// An ordered, mergeable collection of routes.
#[derive(Debug, Clone)]
pub struct Router {
    prefix: String,
    entries: Vec<RouteEntry>,
    body_limit: usize,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self::with_prefix("")
    }

    /// A router whose paths are all registered under `prefix`.
    pub fn with_prefix(prefix: &str) -> Self {
        let prefix = normalize("", prefix);
        Self {
            prefix: if prefix == "/" { String::new() } else { prefix },
            entries: Vec::new(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Cap the number of body bytes compiled endpoints will read.
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn set_body_limit(&mut self, limit: usize) {
        self.body_limit = limit;
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn get(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(Method::GET, path)
    }

    pub fn post(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(Method::POST, path)
    }

    pub fn put(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(Method::PUT, path)
    }

    pub fn patch(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(Method::PATCH, path)
    }

    pub fn delete(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(Method::DELETE, path)
    }

    /// Start registering a route for `method` at `path`.
    pub fn route(&mut self, method: Method, path: &str) -> RouteBuilder<'_> {
        let path = normalize(&self.prefix, path);
        RouteBuilder {
            router: self,
            method,
            path,
            status: StatusCode::OK,
            signature: Signature::new(),
        }
    }

    /// Append every entry of `other`, in order. Handlers are shared, not copied.
    pub fn include(&mut self, other: &Router) -> &mut Self {
        tracing::debug!(
            prefix = %other.prefix,
            count = other.entries.len(),
            "Including routes"
        );
        self.entries.extend(other.entries.iter().cloned());
        self
    }

    /// One endpoint per entry, in registration order.
    pub fn compile(&self) -> Vec<CompiledRoute> {
        self.entries
            .iter()
            .map(|entry| CompiledRoute {
                path: entry.path.clone(),
                method: entry.method.clone(),
                endpoint: Endpoint::new(entry.clone(), self.body_limit),
            })
            .collect()
    }

    /// Build an axum router from the compiled routes.
    ///
    /// Routes are grouped by path shape, so `/{id}` and `/{slug}` share one
    /// axum route under the first spelling registered. Later entries that
    /// spell the captures differently get their captured values renamed back.
    /// Later duplicates of a (shape, method) pair are skipped with a warning.
    pub fn into_axum<S>(&self) -> axum::Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let mut seen = HashSet::new();
        let mut order: Vec<String> = Vec::new();
        let mut spelling: HashMap<String, String> = HashMap::new();
        let mut by_shape: HashMap<String, MethodRouter<S>> = HashMap::new();

        for route in self.compile() {
            let shape = path_shape(&route.path);
            if !seen.insert((shape.clone(), route.method.clone())) {
                tracing::warn!(
                    path = %route.path,
                    method = %route.method,
                    handler = route.endpoint.handler_name(),
                    "Duplicate route shadowed by earlier registration"
                );
                continue;
            }

            let filter = match MethodFilter::try_from(route.method.clone()) {
                Ok(filter) => filter,
                Err(e) => {
                    tracing::warn!(path = %route.path, method = %route.method, error = %e, "Unsupported method, route skipped");
                    continue;
                }
            };

            let mounted = spelling
                .entry(shape.clone())
                .or_insert_with(|| route.path.clone());
            let mut endpoint = route.endpoint;
            if *mounted != route.path {
                let aliases: Vec<(String, String)> = capture_names(mounted)
                    .into_iter()
                    .zip(capture_names(&route.path))
                    .filter(|(from, to)| from != to)
                    .map(|(from, to)| (from.to_string(), to.to_string()))
                    .collect();
                tracing::debug!(
                    path = %route.path,
                    mounted = %mounted,
                    method = %route.method,
                    "Route mounted under an equivalent path"
                );
                endpoint = endpoint.with_path_aliases(aliases);
            }

            let handler = move |req: Request| {
                let endpoint = endpoint.clone();
                async move { endpoint.call(req).await }
            };

            let methods = match by_shape.remove(&shape) {
                Some(existing) => existing.on(filter, handler),
                None => {
                    order.push(shape.clone());
                    axum::routing::on(filter, handler)
                }
            };
            by_shape.insert(shape, methods);
        }

        order.into_iter().fold(axum::Router::new(), |router, shape| {
            match (spelling.get(&shape), by_shape.remove(&shape)) {
                (Some(path), Some(methods)) => router.route(path, methods),
                _ => router,
            }
        })
    }
}

/// `path` with every capture replaced by a placeholder. Paths with the same
/// shape are indistinguishable to the matcher.
fn path_shape(path: &str) -> String {
    let mut shape = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        shape.push_str(&rest[..start]);
        let tail = &rest[start..];
        if tail.starts_with("{{") {
            shape.push_str("{{");
            rest = &tail[2..];
            continue;
        }
        match tail.find('}') {
            Some(end) => {
                shape.push_str(if tail[1..end].starts_with('*') { "{*}" } else { "{}" });
                rest = &tail[end + 1..];
            }
            None => {
                shape.push_str(tail);
                rest = "";
            }
        }
    }
    shape.push_str(rest);
    shape
}

/// Capture names in `path`, in order, without the catch-all `*`.
fn capture_names(path: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let tail = &rest[start..];
        if tail.starts_with("{{") {
            rest = &tail[2..];
            continue;
        }
        match tail.find('}') {
            Some(end) => {
                names.push(tail[1..end].trim_start_matches('*'));
                rest = &tail[end + 1..];
            }
            None => break,
        }
    }
    names
}

/// Builder returned by [`Router::route`] and friends.
///
/// Nothing is registered until a terminal `to*` call.
pub struct RouteBuilder<'r> {
    router: &'r mut Router,
    method: Method,
    path: String,
    status: StatusCode,
    signature: Signature,
}

impl<'r> RouteBuilder<'r> {
    /// Status code of successful responses (default 200).
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// A scalar parameter with no default.
    pub fn param(mut self, name: &str) -> Self {
        self.signature.params.push(Param::scalar(name));
        self
    }

    /// A scalar parameter with a default.
    pub fn param_or(mut self, name: &str, default: impl Into<Value>) -> Self {
        self.signature.params.push(Param::with_default(name, default));
        self
    }

    /// A validation model built from the request body.
    pub fn body<T: Schema>(mut self, name: &str) -> Self {
        self.signature.params.push(Param::schema::<T>(name));
        self
    }

    /// Inject the request context under the reserved `request` name.
    pub fn context(mut self) -> Self {
        self.signature.params.push(Param::scalar(CONTEXT_PARAM));
        self
    }

    pub fn returns(mut self, returns: Returns) -> Self {
        self.signature.returns = returns;
        self
    }

    /// Replace the whole signature.
    pub fn signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    /// Register an async handler.
    pub fn to<F, Fut>(self, f: F) -> Handler
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RouteResult<Reply>> + Send + 'static,
    {
        self.handler(Handler::new(f))
    }

    /// Register a handler that returns immediately.
    pub fn to_sync<F>(self, f: F) -> Handler
    where
        F: Fn(Args) -> RouteResult<Reply> + Send + Sync + 'static,
    {
        self.handler(Handler::sync(f))
    }

    /// Register an already-wrapped handler. Returns it for direct use.
    pub fn handler(self, handler: Handler) -> Handler {
        tracing::debug!(
            method = %self.method,
            path = %self.path,
            handler = handler.name(),
            status = self.status.as_u16(),
            "Route registered"
        );
        self.router.entries.push(RouteEntry {
            path: self.path,
            method: self.method,
            handler: handler.clone(),
            status: self.status,
            signature: Arc::new(self.signature),
        });
        handler
    }
}
