//! HTTP front-end for the viewer.
//!
//! Serves the same typed view models the CLI prints, as JSON, over a
//! session-scoped [`AppContext`]. Search input posted to `/api/input`
//! filters the tree immediately and dispatches the search query through a
//! [`Debouncer`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/api/documents` | Full catalog |
//! | `GET`  | `/api/repositories` | Sorted repository names |
//! | `POST` | `/api/refresh` | Reload the catalog |
//! | `GET`  | `/api/tree` | Tree for `repository`, `fileType`, `q` overrides |
//! | `PUT`  | `/api/filter` | Store the filter state, returns the tree |
//! | `GET`  | `/api/topics` | Topic groups |
//! | `GET`  | `/api/search` | Ranked, highlighted results for `q` |
//! | `POST` | `/api/input` | Search box input (debounced dispatch) |
//! | `GET`  | `/api/state` | Session state |
//! | `GET`/`DELETE` | `/api/notices` | Active notices / dismiss them |
//! | `GET`  | `/api/view/{*path}` | Select and render a document |
//! | `POST` | `/api/actions/{action}` | `reveal` or `copy` the current path |
//! | `GET`  | `/files/{*path}` | Raw bytes of a file under the site root |
//! | `GET`  | `/api/theme` | Theme preference |
//! | `POST` | `/api/theme/toggle` | Flip the theme |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "Document not found: a.md" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `superseded` (409),
//! `search_not_ready` (503), `internal` (500).

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use docs_viewer_core::filter::{apply_filters, FilterState};
use docs_viewer_core::models::Catalog;
use docs_viewer_core::render::{extension, pdf_candidates, DocumentContent, DocumentView};
use docs_viewer_core::search::{SearchError, SearchView, ViewMode};
use docs_viewer_core::topics::TopicsView;
use docs_viewer_core::tree::TreeView;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::context::{
    load_search_shared, refresh_shared, select_shared, AppContext, SharedContext, LOAD_FAILED,
};
use crate::debounce::Debouncer;
use crate::fetch::Location;
use crate::notice::Notice;
use crate::theme::{Theme, ThemeStore};

/// Shared state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    ctx: SharedContext,
    input: Arc<Debouncer<String>>,
    theme: Arc<ThemeStore>,
}

impl AppState {
    /// Wrap a context and start the query dispatcher. Must be called inside
    /// a tokio runtime.
    pub fn new(ctx: AppContext, theme: ThemeStore) -> Self {
        let delay = Duration::from_millis(ctx.config().search.debounce_ms);
        let ctx: SharedContext = Arc::new(RwLock::new(ctx));
        let (input, rx) = Debouncer::new(delay);
        spawn_dispatcher(ctx.clone(), rx);
        Self {
            ctx,
            input: Arc::new(input),
            theme: Arc::new(theme),
        }
    }

    pub fn context(&self) -> &SharedContext {
        &self.ctx
    }
}

/// Apply debounced queries to the context until the debouncer goes away.
pub fn spawn_dispatcher(ctx: SharedContext, mut rx: mpsc::UnboundedReceiver<String>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(query) = rx.recv().await {
            ctx.write().await.dispatch_query(&query);
        }
        tracing::debug!("query dispatcher stopped");
    })
}

/// Load the catalog and search index and build the server state. A failed
/// catalog load leaves an empty catalog and an error notice.
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let theme = ThemeStore::from_config(&config.theme)?;
    let ctx = AppContext::from_config(config.clone())?;
    let state = AppState::new(ctx, theme);

    if let Err(e) = refresh_shared(&state.ctx).await {
        tracing::error!(error = %format!("{:#}", e), "starting with an empty catalog");
    }
    load_search_shared(&state.ctx).await;
    Ok(state)
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/documents", get(handle_documents))
        .route("/api/repositories", get(handle_repositories))
        .route("/api/refresh", post(handle_refresh))
        .route("/api/tree", get(handle_tree))
        .route("/api/filter", put(handle_set_filter))
        .route("/api/topics", get(handle_topics))
        .route("/api/search", get(handle_search))
        .route("/api/input", post(handle_input))
        .route("/api/state", get(handle_state))
        .route("/api/notices", get(handle_notices).delete(handle_dismiss_notices))
        .route("/api/view/{*path}", get(handle_view))
        .route("/api/actions/{action}", post(handle_action))
        .route("/files/{*path}", get(handle_file))
        .route("/api/theme", get(handle_theme))
        .route("/api/theme/toggle", post(handle_theme_toggle))
        .layer(cors)
        .with_state(state)
}

/// Starts the viewer server on `[server].bind` and runs until terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = build_state(config).await?;
    {
        let ctx = state.ctx.read().await;
        println!(
            "Loaded {} document(s) from {} repositories; search {}",
            ctx.catalog().len(),
            ctx.repositories().len(),
            if ctx.search_engine().is_ready() {
                format!("ready ({} entries)", ctx.search_engine().indexed_count())
            } else {
                "disabled".to_string()
            }
        );
    }

    let app = router(state);
    println!("Docs viewer listening on http://{}", config.server.bind);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn error(status: StatusCode, code: &str, message: impl Into<String>) -> AppError {
    AppError {
        status,
        code: code.to_string(),
        message: message.into(),
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    error(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn not_found(message: impl Into<String>) -> AppError {
    error(StatusCode::NOT_FOUND, "not_found", message)
}

fn internal(message: impl Into<String>) -> AppError {
    error(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::NotReady => error(
                StatusCode::SERVICE_UNAVAILABLE,
                "search_not_ready",
                e.to_string(),
            ),
            SearchError::Index(_) => internal(e.to_string()),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ Catalog ============

async fn handle_documents(State(state): State<AppState>) -> Json<Catalog> {
    Json(state.ctx.read().await.catalog().clone())
}

#[derive(Serialize)]
struct RepositoriesResponse {
    repositories: Vec<String>,
}

async fn handle_repositories(State(state): State<AppState>) -> Json<RepositoriesResponse> {
    Json(RepositoriesResponse {
        repositories: state.ctx.read().await.repositories().to_vec(),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    document_count: usize,
}

async fn handle_refresh(State(state): State<AppState>) -> Result<Json<RefreshResponse>, AppError> {
    let document_count = refresh_shared(&state.ctx)
        .await
        .map_err(|e| internal(format!("{} ({:#})", LOAD_FAILED, e)))?;
    Ok(Json(RefreshResponse { document_count }))
}

// ============ Tree, filter, topics ============

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeQuery {
    repository: Option<String>,
    file_type: Option<String>,
    q: Option<String>,
}

/// Tree for the stored filter with any query parameters laid over it.
/// Nothing is stored.
async fn handle_tree(
    State(state): State<AppState>,
    Query(query): Query<TreeQuery>,
) -> Json<TreeView> {
    let ctx = state.ctx.read().await;
    let mut filter = ctx.filter().clone();
    if let Some(repository) = query.repository {
        filter.repository = repository;
    }
    if let Some(file_type) = query.file_type {
        filter.file_type = file_type;
    }
    if let Some(q) = query.q {
        filter.search = q.to_lowercase();
    }
    let visible = apply_filters(ctx.catalog(), &filter);
    Json(TreeView::build(&visible))
}

async fn handle_set_filter(
    State(state): State<AppState>,
    Json(filter): Json<FilterState>,
) -> Json<TreeView> {
    let mut ctx = state.ctx.write().await;
    ctx.set_filter(filter);
    Json(ctx.tree_view())
}

async fn handle_topics(State(state): State<AppState>) -> Json<TopicsView> {
    Json(state.ctx.read().await.topics_view())
}

// ============ Search ============

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchView>, AppError> {
    let q = query
        .q
        .ok_or_else(|| bad_request("query parameter q is required"))?;
    let results = state.ctx.read().await.search(&q)?;
    Ok(Json(SearchView::build(&q, &results)))
}

#[derive(Deserialize)]
struct InputRequest {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InputResponse {
    visible_count: usize,
}

async fn handle_input(
    State(state): State<AppState>,
    Json(input): Json<InputRequest>,
) -> (StatusCode, Json<InputResponse>) {
    let visible_count = {
        let mut ctx = state.ctx.write().await;
        ctx.on_input(&input.text);
        ctx.visible().len()
    };
    state.input.push(input.text);
    (StatusCode::ACCEPTED, Json(InputResponse { visible_count }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateResponse {
    filter: FilterState,
    mode: ViewMode,
    query: String,
    document_count: usize,
    visible_count: usize,
    search_ready: bool,
    indexed_count: usize,
    current_document: Option<String>,
    search: Option<SearchView>,
}

async fn handle_state(State(state): State<AppState>) -> Json<StateResponse> {
    let ctx = state.ctx.read().await;
    Json(StateResponse {
        filter: ctx.filter().clone(),
        mode: ctx.mode(),
        query: ctx.query().to_string(),
        document_count: ctx.catalog().len(),
        visible_count: ctx.visible().len(),
        search_ready: ctx.search_engine().is_ready(),
        indexed_count: ctx.search_engine().indexed_count(),
        current_document: ctx.current_path().map(str::to_string),
        search: ctx.last_search().cloned(),
    })
}

// ============ Notices ============

async fn handle_notices(State(state): State<AppState>) -> Json<Vec<Notice>> {
    Json(state.ctx.write().await.notices())
}

async fn handle_dismiss_notices(State(state): State<AppState>) -> StatusCode {
    state.ctx.write().await.dismiss_notices();
    StatusCode::NO_CONTENT
}

// ============ Documents ============

async fn handle_view(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<DocumentView>, AppError> {
    match select_shared(&state.ctx, &path).await {
        None => Err(not_found(format!("Document not found: {}", path))),
        Some(None) => Err(error(
            StatusCode::CONFLICT,
            "superseded",
            format!("a newer selection replaced {}", path),
        )),
        Some(Some(mut view)) => {
            embed_from_server(&state, &mut view).await;
            Ok(Json(view))
        }
    }
}

/// Point an embedded PDF at a URL a browser can load: the `/files` route
/// for files under the site root, the upstream URL for other HTTP sources.
async fn embed_from_server(state: &AppState, view: &mut DocumentView) {
    let path = view.path.clone();
    let DocumentContent::Pdf { src } = &mut view.content else {
        return;
    };
    let ctx = state.ctx.read().await;
    let Some(candidate) = ctx
        .catalog()
        .get(&path)
        .and_then(|doc| pdf_candidates(doc).into_iter().next())
    else {
        return;
    };
    match ctx.fetcher().locate(&candidate) {
        Some(Location::Site(site_path)) => *src = format!("/files/{}", site_path),
        Some(Location::External(url)) if matches!(url.scheme(), "http" | "https") => {
            *src = url.to_string()
        }
        _ => {}
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionResponse {
    full_path: String,
}

async fn handle_action(
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    let mut ctx = state.ctx.write().await;
    let full_path = match action.as_str() {
        "reveal" => ctx.reveal_path(),
        "copy" => ctx.copy_path(),
        other => return Err(not_found(format!("unknown action: {}", other))),
    };
    let full_path = full_path.ok_or_else(|| bad_request("no document selected"))?;
    Ok(Json(ActionResponse { full_path }))
}

/// Serves `path` relative to the site root (the parent of the base).
async fn handle_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    let fetcher = state.ctx.read().await.fetcher().clone();
    let reference = format!("../{}", path);
    if !matches!(fetcher.locate(&reference), Some(Location::Site(_))) {
        tracing::warn!(path = %path, "refusing file outside the site root");
        return Err(not_found(format!("could not load {}", path)));
    }
    let body = fetcher.fetch(&reference).await.map_err(|e| {
        tracing::debug!(path = %path, error = %e, "file fetch failed");
        not_found(format!("could not load {}", path))
    })?;
    Ok(([(header::CONTENT_TYPE, content_type(&path))], body).into_response())
}

fn content_type(path: &str) -> &'static str {
    match extension(path).as_str() {
        "md" => "text/markdown; charset=utf-8",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "html" => "text/html; charset=utf-8",
        "txt" => "text/plain; charset=utf-8",
        "xml" => "application/xml",
        _ => "application/octet-stream",
    }
}

// ============ Theme ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThemeResponse {
    theme: Theme,
    icon: &'static str,
    diagram_theme: &'static str,
}

impl From<Theme> for ThemeResponse {
    fn from(theme: Theme) -> Self {
        Self {
            theme,
            icon: theme.toggle_icon(),
            diagram_theme: theme.diagram_theme(),
        }
    }
}

async fn handle_theme(State(state): State<AppState>) -> Json<ThemeResponse> {
    Json(state.theme.load().into())
}

async fn handle_theme_toggle(
    State(state): State<AppState>,
) -> Result<Json<ThemeResponse>, AppError> {
    let theme = state
        .theme
        .toggle()
        .map_err(|e| internal(format!("{:#}", e)))?;
    state
        .ctx
        .write()
        .await
        .push_notice(Notice::success(format!("Switched to {} mode", theme.as_str())));
    Ok(Json(theme.into()))
}
