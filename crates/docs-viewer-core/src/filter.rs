//! Filter engine: repository, file-type, and substring predicates.
//!
//! The three predicates are independent and ANDed together, so the visible
//! set does not depend on the order they are applied in.

use serde::{Deserialize, Serialize};

use crate::models::{Catalog, DocumentRecord};

/// Selector value that disables the repository or file-type predicate.
pub const ALL: &str = "all";

/// Current state of the filter controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    /// Repository name, or [`ALL`].
    pub repository: String,
    /// Comma-separated extension suffixes (e.g. `.md,.markdown`), or [`ALL`].
    pub file_type: String,
    /// Free-text substring matched against the path.
    pub search: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            repository: ALL.to_string(),
            file_type: ALL.to_string(),
            search: String::new(),
        }
    }
}

impl FilterState {
    pub fn matches_repository(&self, doc: &DocumentRecord) -> bool {
        self.repository == ALL || doc.repository == self.repository
    }

    pub fn matches_file_type(&self, path: &str) -> bool {
        if self.file_type == ALL {
            return true;
        }
        let path = path.to_lowercase();
        self.file_type
            .split(',')
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
            .any(|ext| path.ends_with(&ext.to_lowercase()))
    }

    pub fn matches_text(&self, path: &str) -> bool {
        self.search.is_empty() || path.to_lowercase().contains(&self.search.to_lowercase())
    }

    pub fn matches(&self, path: &str, doc: &DocumentRecord) -> bool {
        self.matches_repository(doc) && self.matches_file_type(path) && self.matches_text(path)
    }
}

/// Compute the visible paths for a filter state, sorted.
pub fn apply_filters(catalog: &Catalog, filter: &FilterState) -> Vec<String> {
    let mut visible: Vec<String> = catalog
        .iter()
        .filter(|(path, doc)| filter.matches(path, doc))
        .map(|(path, _)| path.clone())
        .collect();
    visible.sort();
    visible
}
