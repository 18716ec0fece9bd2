use std::path::Path as FsPath;
use std::sync::Arc;

use anyhow::Context as _;
use axum::Router;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::assets;
use crate::cli::ServeArgs;
use crate::content_store::{ContentStore, EntryKind, LocalFsContentStore, join_guarded};
use crate::error::ServeError;
use crate::index::ChapterIndex;
use crate::indexer;
use crate::render;

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn ContentStore>,
    index: Arc<ChapterIndex>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>, index: ChapterIndex) -> Self {
        Self {
            store,
            index: Arc::new(index),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/read/:name", get(add_trailing_slash))
        .route("/read/:name/", get(story_page))
        .route("/read/:name/seo/:chapter", get(chapter_page))
        .route("/read/:name/chapter/:chapter", get(add_trailing_slash))
        .route("/read/:name/chapter/:chapter/", get(chapter_data))
        .route("/read/:name/static/*path", get(story_static))
        .route("/static/*path", get(shared_static))
        .route("/service-worker.js", get(service_worker))
        .route("/index.html", get(index_html))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Indexes the content root, writes the PID file, then serves until ctrl-c.
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let store = Arc::new(LocalFsContentStore::new(&args.content_root));
    let index = indexer::build_index(store.as_ref())
        .await
        .with_context(|| format!("index content root: {}", args.content_root.display()))?;
    tracing::info!(
        stories = index.stories().len(),
        chapters = index.len(),
        "chapter index ready"
    );

    crate::pid::write_pid_file(&args.pid_file).await?;

    let addr = args.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {addr}: {err}"))?;
    let local_addr = listener.local_addr().unwrap_or(addr);
    tracing::info!(addr = %local_addr, "listening");

    axum::serve(listener, router(AppState::new(store, index)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve http")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn add_trailing_slash(uri: Uri) -> impl IntoResponse {
    let location = format!("{}/", uri.path());
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)])
}

async fn story_page(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Html<String>, ServeError> {
    let template = load_template(state.store.as_ref()).await?;
    Ok(Html(render::story_page(&template, &name)))
}

async fn chapter_page(
    State(state): State<AppState>,
    Path((name, chapter)): Path<(String, String)>,
    uri: Uri,
) -> Result<Html<String>, ServeError> {
    let record = state
        .index
        .resolve(&name, &chapter)
        .inspect_err(|err| tracing::debug!(%err, "chapter page lookup failed"))?;
    let template = load_template(state.store.as_ref()).await?;
    Ok(Html(render::chapter_page(
        &template,
        &name,
        uri.path(),
        record,
    )))
}

async fn chapter_data(
    State(state): State<AppState>,
    Path((name, chapter)): Path<(String, String)>,
) -> Result<Response, ServeError> {
    let record = state
        .index
        .resolve(&name, &chapter)
        .inspect_err(|err| tracing::debug!(%err, "chapter lookup failed"))?;

    let mut headers = HeaderMap::new();
    assets::insert_no_cache(&mut headers);
    Ok((headers, Json(record)).into_response())
}

async fn story_static(
    State(state): State<AppState>,
    Path((name, path)): Path<(String, String)>,
) -> Result<Response, ServeError> {
    let rel = join_guarded(FsPath::new(""), &[&name, &path])
        .ok_or_else(|| ServeError::InvalidPath(format!("{name}/{path}")))?;
    serve_file(state.store.as_ref(), &rel).await
}

async fn shared_static(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, ServeError> {
    let rel = join_guarded(FsPath::new("static"), &[&path])
        .ok_or_else(|| ServeError::InvalidPath(path.clone()))?;
    serve_file(state.store.as_ref(), &rel).await
}

async fn service_worker(State(state): State<AppState>) -> Result<Response, ServeError> {
    serve_file(state.store.as_ref(), FsPath::new("service-worker.js")).await
}

async fn index_html(State(state): State<AppState>) -> Result<Response, ServeError> {
    serve_file(state.store.as_ref(), FsPath::new(render::PAGE_TEMPLATE)).await
}

async fn load_template(store: &dyn ContentStore) -> Result<String, ServeError> {
    let bytes = store
        .read(FsPath::new(render::PAGE_TEMPLATE))
        .await
        .map_err(|source| ServeError::Template {
            path: render::PAGE_TEMPLATE.to_owned(),
            source,
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

async fn serve_file(store: &dyn ContentStore, rel: &FsPath) -> Result<Response, ServeError> {
    let display = rel.display().to_string();
    let result = match store.stat(rel).await {
        Ok(EntryKind::Dir) => Err(ServeError::IsADirectory(display.clone())),
        Ok(EntryKind::File) => store.read(rel).await.map_err(|source| ServeError::Io {
            path: display.clone(),
            source,
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(ServeError::NotFound(display.clone()))
        }
        Err(source) => Err(ServeError::Io {
            path: display.clone(),
            source,
        }),
    };

    let bytes = result.inspect_err(|err| tracing::debug!(%err, "static file failed"))?;
    let mut response = Response::new(Body::from(bytes));
    *response.headers_mut() = assets::headers_for(&display);
    Ok(response)
}
