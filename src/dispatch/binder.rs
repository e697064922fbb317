//! Argument binding.
//!
//! # Responsibilities
//! - Turn a route's declared parameters and the request context into the
//!   ordered keyword arguments a handler is invoked with
//!
//! # Binding rules (per parameter, in declaration order)
//! 1. `request` receives the context itself
//! 2. A validation-model parameter is built from the whole body mapping
//! 3. Anything else: query value, else body field, else default, else null
//!
//! # Design Decisions
//! - Scalar values pass through verbatim; validation models are where
//!   coercion happens
//! - Model construction failures propagate as `RouteError::Validation`

use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

use crate::dispatch::signature::{Param, ParamKind};
use crate::error::RouteResult;
use crate::http::request::RequestContext;

/// A single bound argument.
pub enum Arg {
    Context(Arc<RequestContext>),
    Value(Value),
    Model(Box<dyn Any + Send + Sync>),
}

impl std::fmt::Debug for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arg::Context(ctx) => f.debug_tuple("Context").field(&ctx.path()).finish(),
            Arg::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Arg::Model(_) => f.write_str("Model(..)"),
        }
    }
}

/// Keyword arguments for one invocation, in declaration order.
#[derive(Debug, Default)]
pub struct Args {
    values: Vec<(String, Arg)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, arg: Arg) {
        let name = name.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = arg,
            None => self.values.push((name, arg)),
        }
    }

    /// Builder-style insert of a plain value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, Arg::Value(value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arg> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The injected request context, if the handler declared one.
    pub fn context(&self) -> Option<&Arc<RequestContext>> {
        self.values.iter().find_map(|(_, a)| match a {
            Arg::Context(ctx) => Some(ctx),
            _ => None,
        })
    }

    /// A scalar argument. `None` when the name was never bound.
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.get(name)? {
            Arg::Value(v) => Some(v),
            _ => None,
        }
    }

    /// A scalar argument that is a JSON string.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(Value::as_str)
    }

    /// A bound validation model, by reference.
    pub fn model<T: 'static>(&self, name: &str) -> Option<&T> {
        match self.get(name)? {
            Arg::Model(m) => m.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Take ownership of a bound validation model.
    pub fn take_model<T: 'static>(&mut self, name: &str) -> Option<T> {
        let idx = self.values.iter().position(|(n, a)| {
            n == name && matches!(a, Arg::Model(m) if m.is::<T>())
        })?;
        match self.values.remove(idx).1 {
            Arg::Model(m) => m.downcast::<T>().ok().map(|b| *b),
            _ => None,
        }
    }
}

/// Bind `params` against `ctx`.
pub fn bind(params: &[Param], ctx: &Arc<RequestContext>) -> RouteResult<Args> {
    let mut args = Args::new();

    for param in params {
        if param.is_context() {
            args.insert(&param.name, Arg::Context(Arc::clone(ctx)));
            continue;
        }

        match &param.kind {
            ParamKind::Schema(schema) => {
                let body = Value::Object(ctx.body_fields().clone());
                let model = schema.build(body).inspect_err(|e| {
                    tracing::debug!(param = %param.name, schema = schema.name(), errors = %e, "Body rejected by model");
                })?;
                args.insert(&param.name, Arg::Model(model));
            }
            ParamKind::Scalar => {
                let value = ctx
                    .query(&param.name)
                    .map(|q| Value::String(q.to_string()))
                    .or_else(|| ctx.body_fields().get(&param.name).cloned())
                    .or_else(|| param.default.clone())
                    .unwrap_or(Value::Null);
                args.insert(&param.name, Arg::Value(value));
            }
        }
    }

    tracing::trace!(count = args.len(), "Arguments bound");
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouteError;
    use crate::model::Schema;
    use axum::body::Bytes;
    use axum::http::{header, HeaderMap, HeaderValue, Method};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Comment {
        author: String,
        text: String,
    }

    impl Schema for Comment {
        const NAME: &'static str = "Comment";
    }

    fn ctx(method: Method, uri: &str, body: &'static str) -> Arc<RequestContext> {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Arc::new(RequestContext::from_parts(
            method,
            &uri.parse().unwrap(),
            headers,
            Bytes::from(body),
        ))
    }

    #[test]
    fn test_missing_scalar_binds_null() {
        let args = bind(&[Param::scalar("limit")], &ctx(Method::GET, "/", "")).unwrap();
        assert_eq!(args.value("limit"), Some(&Value::Null));
    }

    #[test]
    fn test_missing_scalar_uses_default() {
        let args = bind(&[Param::with_default("limit", 20)], &ctx(Method::GET, "/", "")).unwrap();
        assert_eq!(args.value("limit"), Some(&json!(20)));
    }

    #[test]
    fn test_query_beats_body() {
        let ctx = ctx(Method::POST, "/?limit=5", r#"{"limit": 50, "offset": 10}"#);
        let args = bind(&[Param::scalar("limit"), Param::scalar("offset")], &ctx).unwrap();

        assert_eq!(args.str("limit"), Some("5"));
        assert_eq!(args.value("offset"), Some(&json!(10)));
    }

    #[test]
    fn test_context_param_is_injected() {
        let ctx = ctx(Method::GET, "/?request=ignored", "");
        let args = bind(&[Param::scalar("request")], &ctx).unwrap();

        assert!(Arc::ptr_eq(args.context().unwrap(), &ctx));
        assert!(args.value("request").is_none());
    }

    #[test]
    fn test_schema_param_takes_whole_body() {
        let ctx = ctx(Method::POST, "/", r#"{"author": "ann", "text": "hi"}"#);
        let mut args = bind(&[Param::schema::<Comment>("comment")], &ctx).unwrap();

        assert_eq!(args.model::<Comment>("comment").map(|c| c.author.as_str()), Some("ann"));
        let comment: Comment = args.take_model("comment").unwrap();
        assert_eq!(comment.text, "hi");
        assert!(args.get("comment").is_none());
    }

    #[test]
    fn test_schema_param_failure_is_validation_error() {
        let ctx = ctx(Method::POST, "/", r#"{"author": "ann"}"#);
        let err = bind(&[Param::schema::<Comment>("comment")], &ctx).unwrap_err();

        match err {
            RouteError::Validation(errors) => {
                assert_eq!(errors.errors()[0].loc, vec!["text".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_body_never_raises() {
        let ctx = ctx(Method::POST, "/", "{{{");
        let args = bind(&[Param::scalar("title"), Param::with_default("n", 1)], &ctx).unwrap();

        assert_eq!(args.value("title"), Some(&Value::Null));
        assert_eq!(args.value("n"), Some(&json!(1)));
    }

    #[test]
    fn test_arguments_keep_declaration_order() {
        let params = [Param::scalar("b"), Param::scalar("request"), Param::scalar("a")];
        let args = bind(&params, &ctx(Method::GET, "/", "")).unwrap();

        assert_eq!(args.names().collect::<Vec<_>>(), vec!["b", "request", "a"]);
    }
}
