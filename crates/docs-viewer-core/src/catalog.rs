//! Catalog merging and derived catalog facts.

use std::collections::BTreeSet;

use crate::models::Catalog;

/// Merge the supplemental listing into the primary manifest.
///
/// Supplemental entries win on key collision.
pub fn merge_catalogs(mut primary: Catalog, supplemental: Catalog) -> Catalog {
    primary.extend(supplemental);
    primary
}

/// Sorted, de-duplicated repository names, as offered by the repository selector.
pub fn repositories(catalog: &Catalog) -> Vec<String> {
    catalog
        .values()
        .map(|doc| doc.repository.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// All catalog paths in sorted order.
pub fn all_paths(catalog: &Catalog) -> Vec<String> {
    let mut paths: Vec<String> = catalog.keys().cloned().collect();
    paths.sort();
    paths
}
