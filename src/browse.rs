//! Browsing commands: the document tree, topic groups and repositories.

use anyhow::Result;
use docs_viewer_core::filter::FilterState;
use docs_viewer_core::tree::{TreeItem, TreeView};
use std::collections::BTreeMap;

use crate::config::Config;
use crate::context::AppContext;

pub async fn run_tree(config: &Config, filter: FilterState) -> Result<()> {
    let mut ctx = AppContext::connect(config.clone()).await?;
    ctx.set_filter(filter);
    let view = ctx.tree_view();

    if view.items.is_empty() {
        println!("No documents found.");
        return Ok(());
    }

    print!("{}", render_outline(&view));
    println!();
    println!(
        "{} of {} document(s)",
        view.document_count,
        ctx.catalog().len()
    );
    Ok(())
}

/// Indented outline of a tree view, one item per line.
pub fn render_outline(view: &TreeView) -> String {
    let mut out = String::new();
    for item in &view.items {
        write_item(&mut out, item, 0);
    }
    out
}

fn write_item(out: &mut String, item: &TreeItem, depth: usize) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(item.icon);
    out.push(' ');
    out.push_str(&item.name);
    out.push('\n');
    for child in &item.children {
        write_item(out, child, depth + 1);
    }
}

pub async fn run_topics(config: &Config) -> Result<()> {
    let ctx = AppContext::connect(config.clone()).await?;
    let view = ctx.topics_view();

    if view.topics.is_empty() {
        println!("No topics found.");
        return Ok(());
    }

    for topic in &view.topics {
        println!("{} ({})", topic.name, topic.count);
        for item in &topic.items {
            println!("  {} {}", item.icon, item.name);
            println!("      {}", item.path);
        }
        println!();
    }
    Ok(())
}

pub async fn run_repos(config: &Config) -> Result<()> {
    let ctx = AppContext::connect(config.clone()).await?;

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in ctx.catalog().values() {
        *counts.entry(doc.repository.as_str()).or_default() += 1;
    }

    println!("Repositories");
    println!("============");
    println!();
    for repo in ctx.repositories() {
        println!(
            "  {:<30} {:>6} document(s)",
            repo,
            counts.get(repo.as_str()).copied().unwrap_or(0)
        );
    }
    println!();
    println!("  Total: {} document(s)", ctx.catalog().len());
    Ok(())
}
