//! Articles API served on axum.
//!
//! ```text
//! cargo run --example articles -- [config.toml]
//!
//! GET  /api/articles?limit=2
//! GET  /api/articles/{id}
//! POST /api/articles          {"title": "..."}
//! GET  /                      (everything outside /api)
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use bindroute::config::load_config;
use bindroute::observability::init_logging;
use bindroute::{
    App, AppConfig, Args, FieldError, FieldValue, QuerySet, Record, Reply, Returns, RouteError,
    RouteResult, Router, Schema, ValidationErrors,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct Article {
    id: u64,
    title: String,
    published_at: DateTime<Utc>,
}

impl Record for Article {
    const NAME: &'static str = "Article";

    fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("id", self.id.into()),
            ("title", self.title.as_str().into()),
            ("published_at", self.published_at.into()),
        ]
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct NewArticle {
    title: String,
}

impl Schema for NewArticle {
    const NAME: &'static str = "NewArticle";

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "must not be blank"));
        }
        if self.title.len() > 120 {
            errors.push(FieldError::new("title", "at most 120 characters"));
        }
        errors.into_result()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Created {
    id: u64,
    title: String,
}

impl Schema for Created {
    const NAME: &'static str = "Created";
}

type Store = Arc<Mutex<Vec<Article>>>;

fn snapshot(store: &Store) -> anyhow::Result<Vec<Article>> {
    store
        .lock()
        .map(|rows| rows.clone())
        .map_err(|_| anyhow::anyhow!("article store poisoned"))
}

async fn list_articles(store: Store, args: Args) -> RouteResult<Reply> {
    let limit = match args.str("limit") {
        Some(raw) => Some(raw.parse::<usize>().map_err(|_| {
            ValidationErrors::new().with(FieldError::new("limit", "must be a non-negative integer"))
        })?),
        None => None,
    };

    let load = async move {
        let mut rows = snapshot(&store)?;
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok::<_, anyhow::Error>(rows)
    };
    Ok(Reply::cursor(QuerySet::new(load)))
}

async fn show_article(store: Store, args: Args) -> RouteResult<Reply> {
    let id = args
        .context()
        .and_then(|ctx| ctx.path_param("id"))
        .unwrap_or_default()
        .to_string();

    snapshot(&store)?
        .iter()
        .find(|a| a.id.to_string() == id)
        .map(Reply::record)
        .ok_or_else(|| RouteError::not_found(format!("article {id} not found")))
}

async fn create_article(store: Store, mut args: Args) -> RouteResult<Reply> {
    let new: NewArticle = args
        .take_model("article")
        .ok_or_else(|| RouteError::internal("article body not bound"))?;

    let mut rows = store
        .lock()
        .map_err(|_| anyhow::anyhow!("article store poisoned"))?;
    let id = rows.len() as u64 + 1;
    rows.push(Article {
        id,
        title: new.title.clone(),
        published_at: Utc::now(),
    });

    Ok(Reply::json(json!({ "id": id, "title": new.title })))
}

fn articles(store: Store) -> Router {
    let mut router = Router::with_prefix("/articles");

    let s = store.clone();
    router
        .get("/")
        .param("limit")
        .returns(Returns::list_of_records::<Article>())
        .to(move |args| list_articles(s.clone(), args));

    let s = store.clone();
    router
        .get("/{id}")
        .context()
        .returns(Returns::record::<Article>())
        .to(move |args| show_article(s.clone(), args));

    router
        .post("/")
        .status(StatusCode::CREATED)
        .body::<NewArticle>("article")
        .returns(Returns::schema::<Created>())
        .to(move |args| create_article(store.clone(), args));

    router
}

fn seed() -> Store {
    let now = Utc::now();
    Arc::new(Mutex::new(vec![
        Article { id: 1, title: "Binding requests".into(), published_at: now },
        Article { id: 2, title: "Serializing replies".into(), published_at: now },
    ]))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => AppConfig::default(),
    };

    init_logging(&config.logging);
    tracing::info!(
        bind_address = %config.server.bind_address,
        api_prefix = %config.server.api_prefix,
        "Configuration loaded"
    );

    let site = axum::Router::new().route(
        "/",
        axum::routing::get(|| async { "articles demo: see /api/articles" }),
    );

    let mut app = App::new(config.clone());
    app.include(&articles(seed()));
    let app = app.fallback(site);

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    axum::serve(listener, app.into_axum())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
