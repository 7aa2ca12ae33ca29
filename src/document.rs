//! Document rendering: fetches content for a selected document and produces
//! its [`DocumentView`].
//!
//! Markdown walks the candidate chain one reference at a time and stops at
//! the first success; later candidates are never attempted. PDFs are probed
//! at their first candidate only. Fetch failures never propagate: they turn
//! into the metadata-only info view.

use anyhow::Result;
use docs_viewer_core::markdown::render_markdown;
use docs_viewer_core::models::DocumentRecord;
use docs_viewer_core::render::{
    encode_path, markdown_candidates, pdf_candidates, DocumentContent, DocumentKind, DocumentView,
};

use crate::config::Config;
use crate::fetch::{fetch_text, Fetcher};
use crate::notice::Notice;

/// A rendered view plus any notice the render raised.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub view: DocumentView,
    pub notice: Option<Notice>,
}

/// First candidate that loads, as `(reference, content)`.
pub async fn fetch_first(fetcher: &dyn Fetcher, candidates: &[String]) -> Option<(String, String)> {
    for candidate in candidates {
        match fetch_text(fetcher, candidate).await {
            Ok(content) => return Some((candidate.clone(), content)),
            Err(e) => {
                tracing::debug!(candidate = %candidate, error = %e, "candidate failed");
            }
        }
    }
    None
}

pub async fn render_document(
    fetcher: &dyn Fetcher,
    config: &Config,
    path: &str,
    doc: &DocumentRecord,
) -> Rendered {
    let kind = DocumentKind::from_path(path);
    tracing::debug!(path = %path, kind = ?kind, "rendering document");

    let (content, notice) = match kind {
        DocumentKind::Markdown => (render_markdown_document(fetcher, config, path, doc).await, None),
        DocumentKind::Pdf => render_pdf_document(fetcher, path, doc).await,
        DocumentKind::Unsupported => (DocumentContent::unsupported(path, doc), None),
    };

    Rendered {
        view: DocumentView::new(path, doc, content),
        notice,
    }
}

async fn render_markdown_document(
    fetcher: &dyn Fetcher,
    config: &Config,
    path: &str,
    doc: &DocumentRecord,
) -> DocumentContent {
    match fetch_first(fetcher, &markdown_candidates(doc)).await {
        Some((loaded_from, source)) => {
            let rendered = render_markdown(&source, &config.render.plantuml_server);
            tracing::debug!(
                path = %path,
                from = %loaded_from,
                mermaid = rendered.mermaid_blocks,
                plantuml = rendered.plantuml_blocks,
                "markdown rendered"
            );
            DocumentContent::Markdown {
                html: rendered.html,
                loaded_from,
            }
        }
        None => {
            tracing::warn!(path = %path, "could not load document from any path; showing info");
            DocumentContent::info(doc)
        }
    }
}

async fn render_pdf_document(
    fetcher: &dyn Fetcher,
    path: &str,
    doc: &DocumentRecord,
) -> (DocumentContent, Option<Notice>) {
    let candidates = pdf_candidates(doc);
    let Some(first) = candidates.first() else {
        return (DocumentContent::info(doc), None);
    };
    match fetcher.fetch(first).await {
        Ok(_) => (
            DocumentContent::Pdf {
                src: encode_path(first),
            },
            None,
        ),
        Err(e) => {
            tracing::warn!(path = %path, candidate = %first, error = %e, "PDF load failed");
            (
                DocumentContent::info(doc),
                Some(Notice::error(
                    "Failed to load PDF. File may not be accessible.",
                )),
            )
        }
    }
}

/// CLI entry point for `docview show`.
pub async fn run_show(config: &Config, path: &str, html: bool) -> Result<()> {
    let ctx = crate::context::AppContext::connect(config.clone()).await?;
    let Some(doc) = ctx.catalog().get(path).cloned() else {
        anyhow::bail!("Document not found: {}", path);
    };

    let rendered = render_document(ctx.fetcher().as_ref(), config, path, &doc).await;
    if let Some(notice) = &rendered.notice {
        eprintln!("Error: {}", notice.message);
    }
    let view = rendered.view;

    println!("📚 {}", view.breadcrumb.join(" › "));
    println!("full path: {}", view.full_path);
    println!();

    match view.content {
        DocumentContent::Markdown { html: body, loaded_from } => {
            println!("--- Markdown (from {}) ---", loaded_from);
            if html {
                println!("{}", body);
            } else {
                println!("{} bytes of HTML; pass --html to print it", body.len());
            }
        }
        DocumentContent::Pdf { src } => {
            println!("--- PDF ---");
            println!("embed: {}", src);
        }
        DocumentContent::Info(info) => {
            println!("--- Document Information ---");
            println!("Document content could not be loaded from the file system.");
            println!("repository:    {}", info.repository);
            println!("relative path: {}", info.relative_path);
            println!("full path:     {}", info.full_path);
            println!("size:          {} KB", info.size_kb);
            println!("last modified: {}", info.last_modified);
        }
        DocumentContent::Unsupported {
            extension,
            full_path,
        } => {
            println!("⚠️  Unsupported Format");
            println!("Cannot display .{} files in the viewer", extension);
            println!("file path: {}", full_path);
        }
    }

    Ok(())
}
