//! Endpoint adapter.
//!
//! # Responsibilities
//! - Run bind → invoke → serialize for one route
//! - Catch every error exactly once and turn it into a response
//! - Log faults with the handler's identity
//!
//! # Design Decisions
//! - Panics inside handlers are caught here and reported as 500s
//! - Client-facing 500 bodies carry the top-level message only; the full
//!   chain goes to the log

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::response::Response;
use futures_util::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::dispatch::{bind, invoke, serialize, Handler, Signature};
use crate::error::{RouteError, RouteResult};
use crate::http::request::RequestContext;
use crate::http::response::json_response;
use crate::routing::RouteEntry;

/// Per-route request adapter consumed by the host route table.
#[derive(Debug, Clone)]
pub struct Endpoint {
    path: Arc<str>,
    method: Method,
    handler: Handler,
    status: StatusCode,
    signature: Arc<Signature>,
    body_limit: usize,
    path_aliases: Arc<[(String, String)]>,
}

impl Endpoint {
    pub fn new(entry: RouteEntry, body_limit: usize) -> Self {
        Self {
            path: entry.path.into(),
            method: entry.method,
            handler: entry.handler,
            status: entry.status,
            signature: entry.signature,
            body_limit,
            path_aliases: Arc::from(Vec::new()),
        }
    }

    /// Rename captured path values, `(mounted name, declared name)`, before
    /// binding. Used when the route is served under an equivalent path whose
    /// captures are spelled differently.
    pub fn with_path_aliases(mut self, aliases: Vec<(String, String)>) -> Self {
        self.path_aliases = aliases.into();
        self
    }

    pub fn handler_name(&self) -> &'static str {
        self.handler.name()
    }

    /// Serve a raw request.
    pub async fn call(&self, req: Request) -> Response {
        match RequestContext::from_request(req, self.body_limit).await {
            Ok(mut ctx) => {
                ctx.rename_path_params(&self.path_aliases);
                self.dispatch(Arc::new(ctx)).await
            }
            Err(err) => self.error_response(err),
        }
    }

    /// Serve an already-built request context.
    pub async fn dispatch(&self, ctx: Arc<RequestContext>) -> Response {
        let outcome = AssertUnwindSafe(self.run(ctx)).catch_unwind().await;

        match outcome {
            Ok(Ok(body)) => json_response(self.status, body),
            Ok(Err(err)) => self.error_response(err),
            Err(panic) => self.error_response(RouteError::internal(panic_message(panic))),
        }
    }

    async fn run(&self, ctx: Arc<RequestContext>) -> RouteResult<Value> {
        let args = bind(&self.signature.params, &ctx)?;
        let reply = invoke(&self.handler, args).await?;
        serialize(&self.signature.returns, reply).await
    }

    fn error_response(&self, err: RouteError) -> Response {
        match &err {
            RouteError::Internal(cause) => {
                tracing::error!(
                    handler = self.handler.name(),
                    method = %self.method,
                    path = %self.path,
                    error = ?cause,
                    "Unhandled fault in handler"
                );
            }
            other => {
                tracing::warn!(
                    handler = self.handler.name(),
                    method = %self.method,
                    path = %self.path,
                    status = other.status().as_u16(),
                    error = %other,
                    "Request rejected"
                );
            }
        }
        json_response(err.status(), err.body())
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("handler panicked: {msg}")
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Args;
    use crate::model::Reply;
    use crate::routing::Router;
    use axum::body::Body;
    use serde_json::json;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn endpoint(router: &Router) -> Endpoint {
        router.compile().remove(0).endpoint
    }

    #[tokio::test]
    async fn test_success_uses_registered_status() {
        let mut router = Router::new();
        router
            .post("/things")
            .status(StatusCode::CREATED)
            .param("name")
            .to_sync(|args: Args| Ok(Reply::json(json!({ "name": args.value("name") }))));

        let req = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/things?name=bolt")
            .body(Body::empty())
            .unwrap();
        let response = endpoint(&router).call(req).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await, json!({ "name": "bolt" }));
    }

    #[tokio::test]
    async fn test_panic_becomes_500() {
        let mut router = Router::new();
        router.get("/boom").to_sync(|_| panic!("kaboom"));

        let req = axum::http::Request::builder().uri("/boom").body(Body::empty()).unwrap();
        let response = endpoint(&router).call(req).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Internal Server Error", "details": "handler panicked: kaboom" })
        );
    }

    #[tokio::test]
    async fn test_async_panic_becomes_500() {
        async fn late_panic(_: Args) -> RouteResult<Reply> {
            tokio::task::yield_now().await;
            panic!("{}", String::from("late"));
        }

        let mut router = Router::new();
        router.get("/boom").to(late_panic);

        let req = axum::http::Request::builder().uri("/boom").body(Body::empty()).unwrap();
        let response = endpoint(&router).call(req).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["details"], "handler panicked: late");
    }
}
