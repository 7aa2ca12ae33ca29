//! Topic extraction: groups documents by the second segment of their path.
//!
//! The first segment is the top-level repository or category folder, so a
//! path like `Repo/Client/setup.md` lands under topic `Client`. Paths with two
//! or fewer segments belong to no topic.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Catalog, DocumentRecord};
use crate::tree::{file_icon, segments};

/// One document listed under a topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicEntry {
    pub path: String,
    /// Display name (the final path segment).
    pub name: String,
    pub doc: DocumentRecord,
}

/// Topic name to member documents, ordered by topic name.
pub type TopicGroups = BTreeMap<String, Vec<TopicEntry>>;

/// Derive the topic index from the full catalog.
///
/// Entries within a topic are ordered by path.
pub fn extract_topics(catalog: &Catalog) -> TopicGroups {
    let mut topics = TopicGroups::new();

    for (path, doc) in catalog {
        let parts: Vec<&str> = segments(path).collect();
        if parts.len() <= 2 {
            continue;
        }

        topics
            .entry(parts[1].to_string())
            .or_default()
            .push(TopicEntry {
                path: path.clone(),
                name: parts[parts.len() - 1].to_string(),
                doc: doc.clone(),
            });
    }

    for entries in topics.values_mut() {
        entries.sort_by(|a, b| a.path.cmp(&b.path));
    }

    topics
}

/// Topics view model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicsView {
    pub topics: Vec<TopicView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicView {
    pub name: String,
    pub count: usize,
    pub items: Vec<TopicItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicItem {
    pub path: String,
    pub name: String,
    pub icon: &'static str,
}

impl TopicsView {
    pub fn build(topics: &TopicGroups) -> Self {
        let topics = topics
            .iter()
            .map(|(name, entries)| TopicView {
                name: name.clone(),
                count: entries.len(),
                items: entries
                    .iter()
                    .map(|e| TopicItem {
                        path: e.path.clone(),
                        name: e.name.clone(),
                        icon: file_icon(&e.name),
                    })
                    .collect(),
            })
            .collect();
        Self { topics }
    }
}
