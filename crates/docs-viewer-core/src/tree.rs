//! Tree builder: turns flat slash-delimited paths into a folder/file forest.
//!
//! The forest is rebuilt from scratch on every filter change. Catalogs hold
//! hundreds of documents, so there is no incremental update.
//!
//! A node is a folder when at least one path continues past it. When a path
//! is also the prefix of another path (`a/b` and `a/b/c`), the node stays a
//! folder and records that it is a document too, so the result does not
//! depend on insertion order.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// One path segment in the forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub is_folder: bool,
    /// True when some input path ends at this node.
    pub is_document: bool,
    /// Path from the root down to and including this segment.
    pub path: String,
    pub children: Forest,
}

/// Top-level nodes (or a node's children), keyed by segment name.
pub type Forest = BTreeMap<String, TreeNode>;

/// Non-empty segments of a slash-delimited path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Build the forest for a set of paths. Duplicate paths are idempotent.
pub fn build_tree<I, S>(paths: I) -> Forest
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut forest = Forest::new();

    for path in paths {
        let parts: Vec<&str> = segments(path.as_ref()).collect();
        let mut level = &mut forest;
        let mut so_far = String::new();

        for (index, part) in parts.iter().enumerate() {
            if !so_far.is_empty() {
                so_far.push('/');
            }
            so_far.push_str(part);

            let last = index + 1 == parts.len();
            let node = level.entry(part.to_string()).or_insert_with(|| TreeNode {
                name: part.to_string(),
                is_folder: false,
                is_document: false,
                path: so_far.clone(),
                children: Forest::new(),
            });
            if last {
                node.is_document = true;
            } else {
                node.is_folder = true;
            }
            level = &mut node.children;
        }
    }

    forest
}

/// Whether a rendered item is a folder or a selectable file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
}

/// Rendered tree node with children in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeItem {
    pub name: String,
    /// Selection key for files; folders carry their path-so-far.
    pub path: String,
    pub kind: NodeKind,
    pub icon: &'static str,
    /// Folders render expanded by default.
    pub expanded: bool,
    pub children: Vec<TreeItem>,
}

/// Tree view model for the hierarchy tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeView {
    pub document_count: usize,
    pub items: Vec<TreeItem>,
}

impl TreeView {
    pub fn build(visible: &[String]) -> Self {
        Self {
            document_count: visible.len(),
            items: render_tree(&build_tree(visible)),
        }
    }
}

/// Order siblings: folders first, then names in locale-style order.
pub fn render_tree(forest: &Forest) -> Vec<TreeItem> {
    let mut nodes: Vec<&TreeNode> = forest.values().collect();
    nodes.sort_by(|a, b| match (a.is_folder, b.is_folder) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => compare_names(&a.name, &b.name),
    });

    nodes
        .into_iter()
        .map(|node| TreeItem {
            name: node.name.clone(),
            path: node.path.clone(),
            kind: if node.is_folder {
                NodeKind::Folder
            } else {
                NodeKind::File
            },
            icon: if node.is_folder {
                FOLDER_ICON
            } else {
                file_icon(&node.name)
            },
            expanded: node.is_folder,
            children: render_tree(&node.children),
        })
        .collect()
}

/// Case-insensitive comparison with lowercase sorting before uppercase on ties.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

pub const FOLDER_ICON: &str = "📁";

/// Icon for a file name, chosen from its extension.
pub fn file_icon(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or_default().to_lowercase();
    match ext.as_str() {
        "md" => "📝",
        "pdf" => "📄",
        "docx" | "doc" => "📘",
        "ppt" | "pptx" => "📊",
        "html" => "🌐",
        "json" | "xml" => "📋",
        "txt" => "📃",
        "drawio" => "🎨",
        _ => "📄",
    }
}
