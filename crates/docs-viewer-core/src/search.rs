//! Full-text search over the prebuilt search corpus.
//!
//! The corpus is loaded into an in-RAM tantivy index with one text field per
//! corpus column. Each query term is parsed against the weighted fields, so
//! tantivy's per-field BM25 score is multiplied by the field weight:
//!
//! | Field | Default weight |
//! |-------|----------------|
//! | title | 10 |
//! | headings | 5 |
//! | summary | 3 |
//! | category | 2 |
//! | content | 1 |
//!
//! A query term that is a strict prefix of an indexed token also matches, at
//! [`PREFIX_FACTOR`] of the exact-match score. Results come back in
//! non-increasing score order with ties broken by ascending id.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, Query, QueryParser};
use tantivy::schema::{Field, Schema, Value, INDEXED, STORED, TEXT};
use tantivy::tokenizer::TokenStream;
use tantivy::{doc, Index, IndexReader, IndexWriter, Searcher, TantivyDocument};
use thiserror::Error;

use crate::highlight::{highlight_segments, Segment};
use crate::models::{SearchIndexEntry, SearchResult};

/// Queries shorter than this (in characters, after trimming) return nothing.
pub const MIN_QUERY_LEN: usize = 2;

/// Score multiplier for prefix (as opposed to exact) token matches.
pub const PREFIX_FACTOR: f64 = 0.5;

/// Writer arena. One thread, so the corpus lands in a single segment.
const WRITER_HEAP_BYTES: usize = 20_000_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The search corpus could not be loaded; search is disabled.
    #[error("search index is not ready")]
    NotReady,

    #[error("search index error: {0}")]
    Index(String),
}

impl From<tantivy::TantivyError> for SearchError {
    fn from(e: tantivy::TantivyError) -> Self {
        SearchError::Index(e.to_string())
    }
}

impl From<tantivy::query::QueryParserError> for SearchError {
    fn from(e: tantivy::query::QueryParserError) -> Self {
        SearchError::Index(e.to_string())
    }
}

impl From<std::io::Error> for SearchError {
    fn from(e: std::io::Error) -> Self {
        SearchError::Index(e.to_string())
    }
}

/// Relative weight of each indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldWeights {
    pub title: f64,
    pub headings: f64,
    pub summary: f64,
    pub category: f64,
    pub content: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            title: 10.0,
            headings: 5.0,
            summary: 3.0,
            category: 2.0,
            content: 1.0,
        }
    }
}

/// Field handles resolved once when the schema is built.
struct CorpusFields {
    id: Field,
    title: Field,
    headings: Field,
    summary: Field,
    category: Field,
    content: Field,
}

impl CorpusFields {
    fn schema() -> (Schema, Self) {
        let mut builder = Schema::builder();
        let fields = Self {
            id: builder.add_u64_field("id", INDEXED | STORED),
            title: builder.add_text_field("title", TEXT),
            headings: builder.add_text_field("headings", TEXT),
            summary: builder.add_text_field("summary", TEXT),
            category: builder.add_text_field("category", TEXT),
            content: builder.add_text_field("content", TEXT),
        };
        (builder.build(), fields)
    }

    /// Text fields paired with their weight; zero-weight fields are left out.
    fn weighted(&self, weights: &FieldWeights) -> Vec<(Field, f64)> {
        [
            (self.title, weights.title),
            (self.headings, weights.headings),
            (self.summary, weights.summary),
            (self.category, weights.category),
            (self.content, weights.content),
        ]
        .into_iter()
        .filter(|(_, weight)| *weight > 0.0)
        .collect()
    }
}

/// A ranked reference into the index: entry id plus score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRef {
    pub id: u64,
    pub score: f64,
    pub matched_terms: Vec<String>,
}

/// Weighted full-text index over the search corpus.
pub struct SearchIndex {
    entries: HashMap<u64, SearchIndexEntry>,
    index: Index,
    reader: IndexReader,
    id_field: Field,
    /// Fields searched, each with its weight.
    weighted: Vec<(Field, f64)>,
    parser: QueryParser,
}

impl fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchIndex")
            .field("entries", &self.entries.len())
            .field("weighted", &self.weighted)
            .finish()
    }
}

impl SearchIndex {
    /// Index the corpus. A later entry replaces an earlier one with the same id.
    pub fn build(corpus: Vec<SearchIndexEntry>, weights: FieldWeights) -> Result<Self, SearchError> {
        let entries: HashMap<u64, SearchIndexEntry> =
            corpus.into_iter().map(|e| (e.id, e)).collect();

        let (schema, fields) = CorpusFields::schema();
        let index = Index::create_in_ram(schema);
        let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;
        for entry in entries.values() {
            writer.add_document(doc!(
                fields.id => entry.id,
                fields.title => entry.title.as_str(),
                fields.headings => entry.headings.as_str(),
                fields.summary => entry.summary.as_str(),
                fields.category => entry.category.as_str(),
                fields.content => entry.content.as_str(),
            ))?;
        }
        writer.commit()?;
        let reader = index.reader()?;

        let weighted = fields.weighted(&weights);
        let mut parser =
            QueryParser::for_index(&index, weighted.iter().map(|(field, _)| *field).collect());
        for (field, weight) in &weighted {
            parser.set_field_boost(*field, *weight as f32);
        }

        Ok(Self {
            entries,
            index,
            reader,
            id_field: fields.id,
            weighted,
            parser,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&SearchIndexEntry> {
        self.entries.get(&id)
    }

    /// Split text into index tokens with the analyzer the text fields use.
    fn analyze(&self, text: &str) -> Result<BTreeSet<String>, SearchError> {
        let Some((field, _)) = self.weighted.first() else {
            return Ok(BTreeSet::new());
        };
        let mut analyzer = self.index.tokenizer_for_field(*field)?;
        let mut stream = analyzer.token_stream(text);
        let mut tokens = BTreeSet::new();
        stream.process(&mut |token| {
            tokens.insert(token.text.clone());
        });
        Ok(tokens)
    }

    /// Indexed tokens in any searched field that strictly extend `prefix`.
    fn extensions(&self, searcher: &Searcher, prefix: &str) -> Result<BTreeSet<String>, SearchError> {
        let mut found = BTreeSet::new();
        for segment in searcher.segment_readers() {
            for (field, _) in &self.weighted {
                let inverted = segment.inverted_index(*field)?;
                let mut stream = inverted.terms().range().gt(prefix.as_bytes()).into_stream()?;
                while stream.advance() {
                    let Ok(token) = std::str::from_utf8(stream.key()) else {
                        continue;
                    };
                    if !token.starts_with(prefix) {
                        break;
                    }
                    found.insert(token.to_string());
                }
            }
        }
        Ok(found)
    }

    /// Exact matches on `term` plus discounted matches on its extensions.
    fn term_query(&self, searcher: &Searcher, term: &str) -> Result<Box<dyn Query>, SearchError> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> =
            vec![(Occur::Should, self.parser.parse_query(term)?)];
        for token in self.extensions(searcher, term)? {
            let query = self.parser.parse_query(&token)?;
            clauses.push((
                Occur::Should,
                Box::new(BoostQuery::new(query, PREFIX_FACTOR as f32)),
            ));
        }
        Ok(Box::new(BooleanQuery::new(clauses)))
    }

    /// Rank entries for a query, highest score first.
    pub fn rank(&self, query: &str) -> Result<Vec<ScoredRef>, SearchError> {
        let terms = self.analyze(query)?;
        let searcher = self.reader.searcher();
        let limit = (searcher.num_docs() as usize).max(1);

        let mut totals: HashMap<u64, f64> = HashMap::new();
        let mut matched: HashMap<u64, BTreeSet<String>> = HashMap::new();

        for term in &terms {
            let query = self.term_query(&searcher, term)?;
            for (score, address) in searcher.search(&*query, &TopDocs::with_limit(limit))? {
                let doc: TantivyDocument = searcher.doc(address)?;
                let Some(id) = doc.get_first(self.id_field).and_then(|v| v.as_u64()) else {
                    continue;
                };
                *totals.entry(id).or_insert(0.0) += f64::from(score);
                matched.entry(id).or_default().insert(term.clone());
            }
        }

        let mut refs: Vec<ScoredRef> = totals
            .into_iter()
            .map(|(id, score)| ScoredRef {
                id,
                score,
                matched_terms: matched
                    .remove(&id)
                    .map(|set| set.into_iter().collect())
                    .unwrap_or_default(),
            })
            .collect();

        refs.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        Ok(refs)
    }

    /// Rank, then resolve each reference back to its corpus entry.
    ///
    /// References whose id is not in the corpus are dropped.
    pub fn query(&self, query: &str, limit: Option<usize>) -> Result<Vec<SearchResult>, SearchError> {
        let mut results: Vec<SearchResult> = self
            .rank(query)?
            .into_iter()
            .filter_map(|r| {
                self.get(r.id).map(|entry| SearchResult {
                    entry: entry.clone(),
                    score: r.score,
                    matched_terms: r.matched_terms,
                })
            })
            .collect();
        if let Some(limit) = limit {
            results.truncate(limit);
        }
        Ok(results)
    }
}

/// Search front door: either a ready index or disabled.
#[derive(Debug, Default)]
pub struct SearchEngine {
    index: Option<SearchIndex>,
}

impl SearchEngine {
    pub fn ready(index: SearchIndex) -> Self {
        Self { index: Some(index) }
    }

    pub fn disabled() -> Self {
        Self { index: None }
    }

    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    pub fn indexed_count(&self) -> usize {
        self.index.as_ref().map(SearchIndex::len).unwrap_or(0)
    }

    /// Run a query. Short queries return an empty list before the index is
    /// consulted, even when search is disabled.
    pub fn search(&self, query: &str, limit: Option<usize>) -> Result<Vec<SearchResult>, SearchError> {
        if query.trim().chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }
        let index = self.index.as_ref().ok_or(SearchError::NotReady)?;
        index.query(query, limit)
    }
}

/// Which sidebar view a query should switch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Hierarchy,
    Results,
}

impl ViewMode {
    /// `Results` for a dispatchable query, `Hierarchy` for a cleared one,
    /// `None` (stay where you are) for a one-character query.
    pub fn for_query(query: &str) -> Option<Self> {
        let len = query.trim().chars().count();
        if len == 0 {
            Some(ViewMode::Hierarchy)
        } else if len >= MIN_QUERY_LEN {
            Some(ViewMode::Results)
        } else {
            None
        }
    }
}

/// Search results view model with highlighted title and summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchView {
    pub query: String,
    pub count: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: u64,
    pub path: String,
    pub category: String,
    pub score: f64,
    pub title: Vec<Segment>,
    pub summary: Vec<Segment>,
}

impl SearchView {
    pub fn build(query: &str, results: &[SearchResult]) -> Self {
        let results: Vec<SearchHit> = results
            .iter()
            .map(|r| SearchHit {
                id: r.entry.id,
                path: r.entry.path.clone(),
                category: r.entry.category.clone(),
                score: r.score,
                title: highlight_segments(&r.entry.title, query),
                summary: highlight_segments(&r.entry.summary, query),
            })
            .collect();
        Self {
            query: query.to_string(),
            count: results.len(),
            results,
        }
    }
}
