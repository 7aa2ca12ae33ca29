//! Core data models shared by the catalog, search, and rendering pipeline.
//!
//! Field names follow the JSON produced by the external manifest and
//! search-corpus build steps (`camelCase` for catalog records).

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Metadata for one document listed in the catalog manifest.
///
/// Records are immutable once loaded; a refresh replaces the whole catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    /// Repository (top-level source) the document belongs to.
    pub repository: String,
    /// Path relative to the repository root.
    pub relative_path: String,
    /// Path relative to the workspace that holds all repositories.
    #[serde(default)]
    pub workspace_relative_path: String,
    /// Absolute path on the machine that produced the manifest.
    #[serde(default)]
    pub full_path: String,
    /// File size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Last-modified timestamp as written by the manifest builder.
    #[serde(default, deserialize_with = "string_or_number")]
    pub last_modified: String,
}

/// Every known document, keyed by its catalog path.
pub type Catalog = HashMap<String, DocumentRecord>;

/// One record of the prebuilt full-text search corpus.
///
/// Distinct from [`DocumentRecord`]: the corpus is produced by a separate
/// indexing step and is never derived from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchIndexEntry {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "text_or_list")]
    pub headings: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub path: String,
}

/// A search corpus entry annotated with its relevance for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub entry: SearchIndexEntry,
    /// Relevance score; higher is better.
    pub score: f64,
    /// Query terms that matched this entry (exactly or as a prefix).
    pub matched_terms: Vec<String>,
}

/// Manifests written by different tools disagree on whether timestamps are
/// strings or epoch numbers; keep whatever was there as text.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Headings may arrive either pre-joined or as a list.
fn text_or_list<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrList {
        Text(String),
        List(Vec<String>),
    }

    Ok(match Option::<TextOrList>::deserialize(deserializer)? {
        None => String::new(),
        Some(TextOrList::Text(s)) => s,
        Some(TextOrList::List(items)) => items.join(" "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_camel_case_fields() {
        let json = r#"{
            "repository": "LMS",
            "relativePath": "docs/setup.md",
            "workspaceRelativePath": "LMS/docs/setup.md",
            "fullPath": "/work/LMS/docs/setup.md",
            "size": 2048,
            "lastModified": "2024-03-01T10:00:00Z"
        }"#;
        let record: DocumentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.repository, "LMS");
        assert_eq!(record.workspace_relative_path, "LMS/docs/setup.md");
        assert_eq!(record.size, 2048);
        assert_eq!(record.last_modified, "2024-03-01T10:00:00Z");
    }

    #[test]
    fn test_record_numeric_timestamp() {
        let json = r#"{"repository":"R","relativePath":"a.md","lastModified":1700000000}"#;
        let record: DocumentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.last_modified, "1700000000");
        assert_eq!(record.full_path, "");
    }

    #[test]
    fn test_entry_headings_list() {
        let json = r#"{"id":7,"title":"T","headings":["Intro","Usage"]}"#;
        let entry: SearchIndexEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.headings, "Intro Usage");
        assert_eq!(entry.summary, "");
    }
}
