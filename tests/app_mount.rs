//! Mounting routes under the API prefix next to a fallback application.

mod common;

use axum::http::StatusCode;
use bindroute::config::parse_config;
use bindroute::http::X_REQUEST_ID;
use bindroute::{App, AppConfig, Args, Reply, RouteResult, Router};
use common::{get, send};
use serde_json::json;
use tower::ServiceExt;

fn ping(_: Args) -> RouteResult<Reply> {
    Ok(Reply::json(json!({ "pong": true })))
}

fn legacy() -> axum::Router {
    axum::Router::new().route(
        "/legacy/home",
        axum::routing::get(|| async { axum::Json(json!({ "from": "legacy" })) }),
    )
}

fn app_with(prefix: &str) -> App {
    let mut config = AppConfig::default();
    config.server.api_prefix = prefix.to_string();
    let mut app = App::new(config);
    app.get("/ping").to_sync(ping);
    app
}

#[tokio::test]
async fn test_routes_are_nested_under_prefix() {
    let app = app_with("/api").into_axum();

    let (status, body) = send(app.clone(), get("/api/ping")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "pong": true }));

    let (status, _) = send(app, get("/ping")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_root_prefix_mounts_at_top_level() {
    let (status, _) = send(app_with("/").into_axum(), get("/ping")).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unmatched_paths_reach_fallback() {
    let app = app_with("/api").fallback(legacy()).into_axum();

    let (status, body) = send(app.clone(), get("/legacy/home")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "from": "legacy" }));

    let (status, _) = send(app, get("/api/ping")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_included_router_is_mounted() {
    let mut extra = Router::with_prefix("/status");
    extra.get("/").to_sync(ping);

    let mut app = app_with("/api");
    app.include(&extra);

    let (status, _) = send(app.into_axum(), get("/api/status")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = app_with("/api").into_axum();

    let response = app.clone().oneshot(get("/api/ping")).await.unwrap();
    let generated = response.headers().get(X_REQUEST_ID).unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());

    let mut req = get("/api/ping");
    req.headers_mut().insert(X_REQUEST_ID, "abc-123".parse().unwrap());
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.headers().get(X_REQUEST_ID).unwrap(), "abc-123");
}

#[tokio::test]
async fn test_config_drives_prefix() {
    let config = parse_config(
        r#"
        [server]
        api_prefix = "/v2"
        "#,
    )
    .unwrap();
    let mut app = App::new(config);
    app.get("/ping").to_sync(ping);

    let (status, _) = send(app.into_axum(), get("/v2/ping")).await;
    assert_eq!(status, StatusCode::OK);
}
