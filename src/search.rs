use anyhow::{bail, Result};
use docs_viewer_core::highlight::highlight_with;
use docs_viewer_core::models::SearchResult;
use docs_viewer_core::search::{SearchEngine, SearchError, MIN_QUERY_LEN};
use std::time::Duration;

use crate::config::Config;
use crate::fetch::SourceFetcher;
use crate::loader::load_search;

/// Terminal markers for highlighted terms.
const TERM_OPEN: &str = "**";
const TERM_CLOSE: &str = "**";

pub async fn run_search(config: &Config, query: &str, limit: Option<usize>) -> Result<()> {
    if query.trim().chars().count() < MIN_QUERY_LEN {
        println!("No results.");
        return Ok(());
    }

    let fetcher = SourceFetcher::new(
        &config.sources.base,
        Duration::from_secs(config.sources.timeout_secs),
    )?;
    let engine = load_search(&fetcher, &config.sources, config.search.weights).await;
    let results = match search_with(&engine, query, limit.or(config.search.limit)) {
        Ok(results) => results,
        Err(SearchError::NotReady) => bail!(
            "Search index is not available. Check [sources] search_index (currently {:?}).",
            config.sources.search_index.as_deref().unwrap_or("")
        ),
        Err(e) => return Err(e.into()),
    };

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!("{} result(s) for \"{}\"", results.len(), query);
    println!();
    print_results(&results, query);
    Ok(())
}

fn search_with(
    engine: &SearchEngine,
    query: &str,
    limit: Option<usize>,
) -> Result<Vec<SearchResult>, SearchError> {
    let results = engine.search(query, limit)?;
    tracing::info!(query = %query, hits = results.len(), "search complete");
    Ok(results)
}

fn print_results(results: &[SearchResult], query: &str) {
    for (i, result) in results.iter().enumerate() {
        let title = if result.entry.title.is_empty() {
            "(untitled)"
        } else {
            &result.entry.title
        };
        println!(
            "{}. [{:.2}] {}",
            i + 1,
            result.score,
            highlight_with(title, query, TERM_OPEN, TERM_CLOSE)
        );
        if !result.entry.category.is_empty() {
            println!("    category: {}", result.entry.category);
        }
        if !result.entry.path.is_empty() {
            println!("    path: {}", result.entry.path);
        }
        if !result.entry.summary.is_empty() {
            println!(
                "    summary: \"{}\"",
                highlight_with(&result.entry.summary, query, TERM_OPEN, TERM_CLOSE)
                    .replace('\n', " ")
                    .trim()
            );
        }
        println!("    matched: {}", result.matched_terms.join(", "));
        println!("    id: {}", result.entry.id);
        println!();
    }
}
