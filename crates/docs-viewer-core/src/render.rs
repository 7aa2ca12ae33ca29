//! Document render dispatch and document view models.
//!
//! Rendering dispatches purely on the lower-cased file extension of the
//! selected path: markdown is fetched and converted, PDFs are embedded, and
//! every other format (office documents included) gets a fixed
//! "unsupported format" panel. Fetching lives in the application crate; this
//! module decides what to fetch and how the outcome is presented.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::models::DocumentRecord;
use crate::tree::segments;

/// Characters left unescaped in a path segment (matches `encodeURIComponent`).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Markdown,
    Pdf,
    Unsupported,
}

impl DocumentKind {
    pub fn from_path(path: &str) -> Self {
        match extension(path).as_str() {
            "md" => DocumentKind::Markdown,
            "pdf" => DocumentKind::Pdf,
            _ => DocumentKind::Unsupported,
        }
    }
}

/// Lower-cased extension of the final path segment, or `""` when it has none.
pub fn extension(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// Candidate locations for markdown content, tried in order.
pub fn markdown_candidates(doc: &DocumentRecord) -> Vec<String> {
    vec![
        format!("../{}", doc.workspace_relative_path),
        doc.workspace_relative_path.clone(),
        doc.relative_path.clone(),
    ]
}

/// Candidate locations for a PDF; only the first is embedded.
pub fn pdf_candidates(doc: &DocumentRecord) -> Vec<String> {
    vec![
        format!("/{}", doc.workspace_relative_path),
        format!("../{}", doc.workspace_relative_path),
        doc.workspace_relative_path.clone(),
    ]
}

/// Percent-encode each segment separately, keeping `/`, `.` and `..` literal.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment {
            "" | "." | ".." => segment.to_string(),
            _ => utf8_percent_encode(segment, SEGMENT).to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Metadata-only view shown when content cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub repository: String,
    pub relative_path: String,
    pub full_path: String,
    /// Size in kilobytes, two decimals.
    pub size_kb: String,
    pub last_modified: String,
}

impl DocumentInfo {
    pub fn from_record(doc: &DocumentRecord) -> Self {
        Self {
            repository: doc.repository.clone(),
            relative_path: doc.relative_path.clone(),
            full_path: doc.full_path.clone(),
            size_kb: format!("{:.2}", doc.size as f64 / 1024.0),
            last_modified: doc.last_modified.clone(),
        }
    }
}

/// What the viewer pane shows for a selected document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DocumentContent {
    /// Rendered markdown and the candidate it was loaded from.
    #[serde(rename_all = "camelCase")]
    Markdown { html: String, loaded_from: String },
    /// Inline-embedded PDF.
    Pdf { src: String },
    /// Content could not be loaded; show metadata instead.
    Info(DocumentInfo),
    /// Format the viewer never renders.
    #[serde(rename_all = "camelCase")]
    Unsupported { extension: String, full_path: String },
}

impl DocumentContent {
    pub fn unsupported(path: &str, doc: &DocumentRecord) -> Self {
        DocumentContent::Unsupported {
            extension: extension(path),
            full_path: doc.full_path.clone(),
        }
    }

    pub fn info(doc: &DocumentRecord) -> Self {
        DocumentContent::Info(DocumentInfo::from_record(doc))
    }
}

/// A selected document with its breadcrumb and content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    pub path: String,
    pub breadcrumb: Vec<String>,
    pub kind: DocumentKind,
    /// Target of the copy-path and reveal-path actions.
    pub full_path: String,
    pub content: DocumentContent,
}

impl DocumentView {
    pub fn new(path: &str, doc: &DocumentRecord, content: DocumentContent) -> Self {
        Self {
            path: path.to_string(),
            breadcrumb: breadcrumb(path),
            kind: DocumentKind::from_path(path),
            full_path: doc.full_path.clone(),
            content,
        }
    }
}

pub fn breadcrumb(path: &str) -> Vec<String> {
    segments(path).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::record;

    #[test]
    fn test_kind_by_extension() {
        assert_eq!(DocumentKind::from_path("a/B.MD"), DocumentKind::Markdown);
        assert_eq!(DocumentKind::from_path("a/manual.pdf"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_path("a/spec.docx"), DocumentKind::Unsupported);
        assert_eq!(DocumentKind::from_path("v1.2/README"), DocumentKind::Unsupported);
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("dir.v2/file.PPTX"), "pptx");
        assert_eq!(extension("dir.v2/Makefile"), "");
    }

    #[test]
    fn test_markdown_candidate_order() {
        let mut doc = record("R", "docs/a.md");
        doc.workspace_relative_path = "R/docs/a.md".to_string();
        assert_eq!(
            markdown_candidates(&doc),
            vec!["../R/docs/a.md", "R/docs/a.md", "docs/a.md"]
        );
        assert_eq!(pdf_candidates(&doc)[0], "/R/docs/a.md");
    }

    #[test]
    fn test_encode_path_keeps_relative_segments() {
        assert_eq!(
            encode_path("../My Docs/./a#1.md"),
            "../My%20Docs/./a%231.md"
        );
        assert_eq!(encode_path("/R/ü.pdf"), "/R/%C3%BC.pdf");
    }

    #[test]
    fn test_info_size_kb() {
        let mut doc = record("R", "a.md");
        doc.size = 1536;
        match DocumentContent::info(&doc) {
            DocumentContent::Info(info) => assert_eq!(info.size_kb, "1.50"),
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_for_docx() {
        let doc = record("R", "x/spec.docx");
        let view = DocumentView::new(
            "x/spec.docx",
            &doc,
            DocumentContent::unsupported("x/spec.docx", &doc),
        );
        assert_eq!(view.kind, DocumentKind::Unsupported);
        assert_eq!(view.breadcrumb, vec!["x", "spec.docx"]);
        assert_eq!(
            view.content,
            DocumentContent::Unsupported {
                extension: "docx".to_string(),
                full_path: "/work/x/spec.docx".to_string(),
            }
        );
    }

    #[test]
    fn test_content_serialization_tag() {
        let json = serde_json::to_value(DocumentContent::Pdf {
            src: "/R/a.pdf".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "pdf");
        assert_eq!(json["src"], "/R/a.pdf");
    }
}
