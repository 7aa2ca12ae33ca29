//! Application context: the viewer's session state behind explicit methods.
//!
//! One [`AppContext`] owns the catalog snapshot, filter state, visible set,
//! search engine, notices and current selection. The server shares it as
//! [`SharedContext`] (a single `tokio::sync::RwLock`); loads and renders do
//! their I/O outside the lock and only take the write lock to install the
//! result.
//!
//! Selections are tagged with a generation number. A render that finishes
//! after a newer selection began is discarded.

use anyhow::Result;
use chrono::Utc;
use docs_viewer_core::catalog::repositories;
use docs_viewer_core::filter::{apply_filters, FilterState};
use docs_viewer_core::models::{Catalog, DocumentRecord, SearchResult};
use docs_viewer_core::render::DocumentView;
use docs_viewer_core::search::{SearchEngine, SearchError, SearchView, ViewMode};
use docs_viewer_core::topics::{extract_topics, TopicGroups, TopicsView};
use docs_viewer_core::tree::TreeView;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::document::Rendered;
use crate::fetch::{Fetcher, SourceFetcher};
use crate::loader::{load_catalog, load_search, LoadedCatalog};
use crate::notice::{Notice, NoticeBoard};

pub type SharedContext = Arc<RwLock<AppContext>>;

pub const LOAD_FAILED: &str =
    "Failed to load documents. Please ensure documents-available.json exists.";
pub const REFRESHED: &str = "Documents refreshed successfully";
pub const NOT_FOUND: &str = "Document not found";

/// Catalog plus everything derived from it. Replaced as a whole on reload.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub catalog: Catalog,
    pub topics: TopicGroups,
    pub repositories: Vec<String>,
}

impl Snapshot {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            topics: extract_topics(&catalog),
            repositories: repositories(&catalog),
            catalog,
        }
    }
}

/// Handed out by [`AppContext::begin_selection`]; redeemed by
/// [`AppContext::finish_selection`] once the render completes.
#[derive(Debug, Clone)]
pub struct SelectionTicket {
    pub generation: u64,
    pub path: String,
    pub doc: DocumentRecord,
}

#[derive(Debug, Default)]
struct Selection {
    generation: u64,
    path: Option<String>,
    view: Option<DocumentView>,
}

pub struct AppContext {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
    snapshot: Snapshot,
    filter: FilterState,
    visible: Vec<String>,
    search: SearchEngine,
    notices: NoticeBoard,
    selection: Selection,
    mode: ViewMode,
    query: String,
    last_search: Option<SearchView>,
}

impl AppContext {
    /// An empty context: no documents, search disabled.
    pub fn new(config: Config, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
            snapshot: Snapshot::default(),
            filter: FilterState::default(),
            visible: Vec::new(),
            search: SearchEngine::disabled(),
            notices: NoticeBoard::default(),
            selection: Selection::default(),
            mode: ViewMode::Hierarchy,
            query: String::new(),
            last_search: None,
        }
    }

    /// Build a context with a [`SourceFetcher`] for the configured base.
    pub fn from_config(config: Config) -> Result<Self> {
        let fetcher = SourceFetcher::new(
            &config.sources.base,
            Duration::from_secs(config.sources.timeout_secs),
        )?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    /// Build a context and load the catalog and search index. A primary
    /// catalog failure is returned as an error.
    pub async fn connect(config: Config) -> Result<Self> {
        let mut ctx = Self::from_config(config)?;
        let loaded = load_catalog(ctx.fetcher.as_ref(), &ctx.config.sources).await?;
        ctx.install_catalog(loaded);
        ctx.search = load_search(
            ctx.fetcher.as_ref(),
            &ctx.config.sources,
            ctx.config.search.weights,
        )
        .await;
        Ok(ctx)
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.fetcher
    }

    pub fn catalog(&self) -> &Catalog {
        &self.snapshot.catalog
    }

    pub fn repositories(&self) -> &[String] {
        &self.snapshot.repositories
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn visible(&self) -> &[String] {
        &self.visible
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn last_search(&self) -> Option<&SearchView> {
        self.last_search.as_ref()
    }

    pub fn search_engine(&self) -> &SearchEngine {
        &self.search
    }

    pub fn current_path(&self) -> Option<&str> {
        self.selection.path.as_deref()
    }

    pub fn current_view(&self) -> Option<&DocumentView> {
        self.selection.view.as_ref()
    }

    /// Swap in a freshly loaded catalog and recompute derived state.
    pub fn install_catalog(&mut self, loaded: LoadedCatalog) {
        self.snapshot = Snapshot::new(loaded.catalog);
        self.recompute_visible();
    }

    pub fn install_search(&mut self, engine: SearchEngine) {
        self.search = engine;
    }

    /// Record the outcome of a catalog reload. Failure raises an error notice
    /// and keeps the previous snapshot.
    pub fn apply_reload(&mut self, result: Result<LoadedCatalog>) -> Result<usize> {
        match result {
            Ok(loaded) => {
                self.install_catalog(loaded);
                self.notices.push(Notice::success(REFRESHED));
                Ok(self.snapshot.catalog.len())
            }
            Err(e) => {
                tracing::error!(error = %format!("{:#}", e), "catalog reload failed");
                self.notices.push(Notice::error(LOAD_FAILED));
                Err(e)
            }
        }
    }

    /// Reload the catalog while owning the context directly.
    pub async fn refresh(&mut self) -> Result<usize> {
        let result = load_catalog(self.fetcher.as_ref(), &self.config.sources).await;
        self.apply_reload(result)
    }

    pub fn set_filter(&mut self, filter: FilterState) -> &[String] {
        self.filter = filter;
        self.recompute_visible();
        &self.visible
    }

    /// The text box feeds the substring filter immediately; the search
    /// query itself is dispatched later through the debouncer.
    pub fn on_input(&mut self, text: &str) {
        self.filter.search = text.to_lowercase();
        self.recompute_visible();
    }

    fn recompute_visible(&mut self) {
        self.visible = apply_filters(&self.snapshot.catalog, &self.filter);
    }

    pub fn tree_view(&self) -> TreeView {
        TreeView::build(&self.visible)
    }

    pub fn topics_view(&self) -> TopicsView {
        TopicsView::build(&self.snapshot.topics)
    }

    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        self.search.search(query, self.config.search.limit)
    }

    /// Apply a debounced query: switch views and refresh the result list.
    pub fn dispatch_query(&mut self, query: &str) -> Option<ViewMode> {
        let mode = ViewMode::for_query(query)?;
        self.query = query.to_string();
        self.mode = mode;
        self.last_search = match mode {
            ViewMode::Hierarchy => None,
            ViewMode::Results => match self.search(query) {
                Ok(results) => {
                    tracing::debug!(query = %query, hits = results.len(), "search dispatched");
                    Some(SearchView::build(query, &results))
                }
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "search skipped");
                    Some(SearchView::build(query, &[]))
                }
            },
        };
        Some(mode)
    }

    /// Start a selection. Every call bumps the generation, so any render
    /// still in flight becomes stale. Unknown paths raise a notice.
    pub fn begin_selection(&mut self, path: &str) -> Option<SelectionTicket> {
        self.selection.generation += 1;
        let Some(doc) = self.snapshot.catalog.get(path).cloned() else {
            self.notices.push(Notice::error(NOT_FOUND));
            return None;
        };
        self.selection.path = Some(path.to_string());
        Some(SelectionTicket {
            generation: self.selection.generation,
            path: path.to_string(),
            doc,
        })
    }

    /// Install a finished render. Returns `false` when a newer selection has
    /// started since the ticket was issued.
    pub fn finish_selection(&mut self, ticket: &SelectionTicket, rendered: Rendered) -> bool {
        if ticket.generation != self.selection.generation {
            tracing::debug!(
                path = %ticket.path,
                generation = ticket.generation,
                current = self.selection.generation,
                "discarding stale render"
            );
            return false;
        }
        if let Some(notice) = rendered.notice {
            self.notices.push(notice);
        }
        self.selection.view = Some(rendered.view);
        true
    }

    /// "Open externally": surface the current document's full path.
    pub fn reveal_path(&mut self) -> Option<String> {
        let full_path = self.current_full_path()?;
        self.notices
            .push(Notice::success(format!("Path: {}", full_path)));
        Some(full_path)
    }

    /// Copy the current document's full path.
    pub fn copy_path(&mut self) -> Option<String> {
        let full_path = self.current_full_path()?;
        self.notices.push(Notice::success("Path copied to clipboard"));
        Some(full_path)
    }

    fn current_full_path(&self) -> Option<String> {
        let path = self.selection.path.as_deref()?;
        self.snapshot
            .catalog
            .get(path)
            .map(|doc| doc.full_path.clone())
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn notices(&mut self) -> Vec<Notice> {
        self.notices.active(Utc::now())
    }

    pub fn dismiss_notices(&mut self) {
        self.notices.dismiss_all();
    }
}

/// Reload the catalog of a shared context without holding the lock across
/// the fetches.
pub async fn refresh_shared(ctx: &SharedContext) -> Result<usize> {
    let (fetcher, config) = {
        let guard = ctx.read().await;
        (guard.fetcher.clone(), guard.config.clone())
    };
    let result = load_catalog(fetcher.as_ref(), &config.sources).await;
    ctx.write().await.apply_reload(result)
}

/// Load the search index into a shared context.
pub async fn load_search_shared(ctx: &SharedContext) {
    let (fetcher, config) = {
        let guard = ctx.read().await;
        (guard.fetcher.clone(), guard.config.clone())
    };
    let engine = load_search(fetcher.as_ref(), &config.sources, config.search.weights).await;
    ctx.write().await.install_search(engine);
}

/// Select and render a document in a shared context. Returns `None` when the
/// path is unknown, `Some(None)` when the render was superseded.
pub async fn select_shared(ctx: &SharedContext, path: &str) -> Option<Option<DocumentView>> {
    let (ticket, fetcher, config) = {
        let mut guard = ctx.write().await;
        let ticket = guard.begin_selection(path)?;
        (ticket, guard.fetcher.clone(), guard.config.clone())
    };

    let rendered =
        crate::document::render_document(fetcher.as_ref(), &config, &ticket.path, &ticket.doc)
            .await;
    let view = rendered.view.clone();

    let mut guard = ctx.write().await;
    Some(guard.finish_selection(&ticket, rendered).then_some(view))
}
