//! Per-request context handed to the binder.
//!
//! # Responsibilities
//! - Capture method, path, path captures, query pairs, headers and body bytes
//! - Parse the body once, on first use, into a field mapping
//!
//! # Design Decisions
//! - Only POST/PUT/PATCH bodies are read; other methods see an empty mapping
//! - Bodies over the configured limit are rejected, never truncated
//! - Body parsing never fails: JSON object, then urlencoded form, then empty
//! - Query values stay strings; no coercion happens at this layer

use axum::body::{Body, Bytes};
use axum::extract::{FromRequestParts, RawPathParams, Request};
use axum::http::{header, HeaderMap, Method, Uri};
use futures_util::StreamExt;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{RouteError, RouteResult};

/// Read-only view of one inbound request.
#[derive(Debug)]
pub struct RequestContext {
    method: Method,
    path: String,
    path_params: HashMap<String, String>,
    query: HashMap<String, String>,
    headers: HeaderMap,
    body: Bytes,
    body_fields: OnceLock<Map<String, Value>>,
}

impl RequestContext {
    /// Build a context from already-split request pieces.
    pub fn from_parts(method: Method, uri: &Uri, headers: HeaderMap, body: Bytes) -> Self {
        let query = uri
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        let body = if carries_body(&method) { body } else { Bytes::new() };

        Self {
            method,
            path: uri.path().to_string(),
            path_params: HashMap::new(),
            query,
            headers,
            body,
            body_fields: OnceLock::new(),
        }
    }

    /// Consume an axum request, reading at most `body_limit` bytes of body.
    ///
    /// A body over the limit is rejected with `RouteError::PayloadTooLarge`.
    /// A body that cannot be read at all is treated as empty.
    pub async fn from_request(req: Request, body_limit: usize) -> RouteResult<Self> {
        let (mut parts, body) = req.into_parts();

        let path_params: HashMap<String, String> =
            match RawPathParams::from_request_parts(&mut parts, &()).await {
                Ok(params) => params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                Err(_) => HashMap::new(),
            };

        let bytes = if carries_body(&parts.method) {
            read_body(body, body_limit).await?
        } else {
            Bytes::new()
        };

        let mut ctx = Self::from_parts(parts.method, &parts.uri, parts.headers, bytes);
        ctx.path_params = path_params;
        Ok(ctx)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Query parameter by name. Repeated keys keep the last value.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Value captured by a `{name}` segment of the route path.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Move captured values to new names, `(from, to)`. All values are taken
    /// out before any is reinserted, so names may be swapped.
    pub(crate) fn rename_path_params(&mut self, aliases: &[(String, String)]) {
        let moved: Vec<(&String, Option<String>)> = aliases
            .iter()
            .map(|(from, to)| (to, self.path_params.remove(from)))
            .collect();
        for (to, value) in moved {
            if let Some(value) = value {
                self.path_params.insert(to.clone(), value);
            }
        }
    }

    /// Raw body bytes (empty for methods that carry no body).
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The parsed body mapping, computed on first access.
    pub fn body_fields(&self) -> &Map<String, Value> {
        self.body_fields
            .get_or_init(|| parse_body(&self.headers, &self.body))
    }
}

/// Methods whose requests conventionally carry a body.
pub fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

async fn read_body(body: Body, limit: usize) -> RouteResult<Bytes> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::warn!(error = %e, "Request body unreadable, treating as empty");
                return Ok(Bytes::new());
            }
        };
        if buf.len() + chunk.len() > limit {
            return Err(RouteError::PayloadTooLarge(limit));
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(buf))
}

fn parse_body(headers: &HeaderMap, body: &[u8]) -> Map<String, Value> {
    if body.is_empty() {
        return Map::new();
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => return fields,
        Ok(_) => tracing::debug!("JSON body is not an object, trying form data"),
        Err(e) => tracing::debug!(error = %e, "Body is not JSON, trying form data"),
    }

    if is_urlencoded_form(headers) {
        return url::form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
            .collect();
    }

    tracing::debug!("Body is neither JSON nor form data, binding as empty");
    Map::new()
}

fn is_urlencoded_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}
