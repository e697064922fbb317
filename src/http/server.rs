//! Application mount.
//!
//! # Responsibilities
//! - Own the root route registry and its configuration
//! - Mount compiled routes under the configured API prefix
//! - Route everything else to an optional fallback application
//! - Wire up middleware (tracing, request ID)
//!
//! # Design Decisions
//! - The mounted router is rebuilt from the registry on every `into_axum`,
//!   so routes included later are always reflected
//! - Serving (listener, TLS, shutdown) is left to the caller

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::routing::{normalize, RouteBuilder, Router};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Routes plus the configuration needed to mount them.
#[derive(Debug, Clone)]
pub struct App {
    config: AppConfig,
    router: Router,
    fallback: Option<axum::Router>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let router = Router::new().body_limit(config.server.body_limit_bytes);
        Self {
            config,
            router,
            fallback: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn get(&mut self, path: &str) -> RouteBuilder<'_> {
        self.router.get(path)
    }

    pub fn post(&mut self, path: &str) -> RouteBuilder<'_> {
        self.router.post(path)
    }

    /// Merge another registry's routes into the app.
    pub fn include(&mut self, other: &Router) -> &mut Self {
        self.router.include(other);
        self
    }

    /// Application that receives every request outside the API prefix.
    pub fn fallback(mut self, app: axum::Router) -> Self {
        self.fallback = Some(app);
        self
    }

    /// Build the complete axum application.
    pub fn into_axum(&self) -> axum::Router {
        let api: axum::Router = self.router.into_axum();
        let prefix = normalize("", &self.config.server.api_prefix);

        tracing::info!(
            api_prefix = %prefix,
            routes = self.router.entries().len(),
            fallback = self.fallback.is_some(),
            "Mounting routes"
        );

        let mut app = if prefix == "/" {
            axum::Router::new().merge(api)
        } else {
            axum::Router::new().nest(&prefix, api)
        };

        if let Some(fallback) = &self.fallback {
            app = app.fallback_service(fallback.clone());
        }

        app.layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                let request_id = req
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }
}
