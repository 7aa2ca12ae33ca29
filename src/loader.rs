//! Catalog and search-corpus loading.
//!
//! The primary manifest is required: any failure is returned to the caller.
//! The supplemental listing is best-effort and its failures are logged and
//! skipped. The search corpus is optional too; without it search is disabled
//! but everything else keeps working.

use anyhow::{Context, Result};
use docs_viewer_core::catalog::merge_catalogs;
use docs_viewer_core::models::{Catalog, SearchIndexEntry};
use docs_viewer_core::search::{FieldWeights, SearchEngine, SearchIndex};
use serde::Deserialize;

use crate::config::SourcesConfig;
use crate::fetch::{fetch_json, Fetcher};

/// A merged catalog plus how many entries each source contributed.
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub primary_count: usize,
    /// `None` when the supplemental source was absent or failed.
    pub supplemental_count: Option<usize>,
}

pub async fn load_catalog(fetcher: &dyn Fetcher, sources: &SourcesConfig) -> Result<LoadedCatalog> {
    let primary: Catalog = fetch_json(fetcher, &sources.catalog)
        .await
        .with_context(|| format!("Failed to load documents from {}", sources.catalog))?;
    let primary_count = primary.len();
    tracing::info!(count = primary_count, source = %sources.catalog, "loaded catalog");

    let supplemental = match non_empty(sources.supplemental.as_deref()) {
        Some(reference) => match fetch_json::<Catalog>(fetcher, reference).await {
            Ok(docs) => {
                tracing::info!(count = docs.len(), source = %reference, "loaded supplemental documents");
                Some(docs)
            }
            Err(e) => {
                tracing::warn!(source = %reference, error = %format!("{:#}", e), "could not load supplemental documents");
                None
            }
        },
        None => None,
    };

    let supplemental_count = supplemental.as_ref().map(|s| s.len());
    let catalog = match supplemental {
        Some(docs) => merge_catalogs(primary, docs),
        None => primary,
    };
    tracing::info!(total = catalog.len(), "catalog ready");

    Ok(LoadedCatalog {
        catalog,
        primary_count,
        supplemental_count,
    })
}

/// The corpus is either a bare list or an object with a `documents` list.
#[derive(Deserialize)]
#[serde(untagged)]
enum Corpus {
    List(Vec<SearchIndexEntry>),
    Wrapped { documents: Vec<SearchIndexEntry> },
}

impl Corpus {
    fn into_entries(self) -> Vec<SearchIndexEntry> {
        match self {
            Corpus::List(entries) => entries,
            Corpus::Wrapped { documents } => documents,
        }
    }
}

/// Build the search engine, or a disabled one when the corpus is unavailable.
pub async fn load_search(
    fetcher: &dyn Fetcher,
    sources: &SourcesConfig,
    weights: FieldWeights,
) -> SearchEngine {
    let Some(reference) = non_empty(sources.search_index.as_deref()) else {
        tracing::info!("no search index configured; search disabled");
        return SearchEngine::disabled();
    };

    match fetch_json::<Corpus>(fetcher, reference).await {
        Ok(corpus) => match SearchIndex::build(corpus.into_entries(), weights) {
            Ok(index) => {
                tracing::info!(entries = index.len(), source = %reference, "search index built");
                SearchEngine::ready(index)
            }
            Err(e) => {
                tracing::warn!(source = %reference, error = %e, "failed to build search index; search disabled");
                SearchEngine::disabled()
            }
        },
        Err(e) => {
            tracing::warn!(source = %reference, error = %format!("{:#}", e), "search index unavailable; search disabled");
            SearchEngine::disabled()
        }
    }
}

fn non_empty(reference: Option<&str>) -> Option<&str> {
    reference.map(str::trim).filter(|r| !r.is_empty())
}
