use axum::{extract::Path, http::StatusCode, routing::get, Router};
use docs_viewer::config::Config;
use docs_viewer::context::AppContext;
use docs_viewer::document::render_document;
use docs_viewer_core::render::DocumentContent;

const CATALOG: &str = r#"{
    "Docs/Guides/setup guide.md": {"repository": "Docs", "relativePath": "Guides/setup guide.md", "workspaceRelativePath": "Docs/Guides/setup guide.md", "fullPath": "/srv/Docs/Guides/setup guide.md", "size": 100, "lastModified": 1717171717},
    "Docs/Manuals/manual.pdf": {"repository": "Docs", "relativePath": "Manuals/manual.pdf", "workspaceRelativePath": "Docs/Manuals/manual.pdf", "fullPath": "/srv/Docs/Manuals/manual.pdf", "size": 2048, "lastModified": "2024-02-02"}
}"#;

const GENERATED: &str = r#"{
    "Generated/Reports/weekly.md": {"repository": "Generated", "relativePath": "Reports/weekly.md", "workspaceRelativePath": "Generated/Reports/weekly.md"}
}"#;

const CORPUS: &str = r#"{"documents": [{"id": 7, "title": "Setup", "headings": ["Install", "Configure"], "path": "Docs/Guides/setup guide.md"}]}"#;

async fn guide(Path(file): Path<String>) -> Result<&'static str, StatusCode> {
    match file.as_str() {
        "setup guide.md" => Ok("# Setup\n\nline one\nline two\n"),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

/// Static site: catalog one level above `/Viewer/`, supplemental listing at
/// the host root, content files under their workspace paths.
async fn start(with_generated: bool) -> String {
    let mut app = Router::new()
        .route("/site/documents-available.json", get(|| async { CATALOG }))
        .route("/site/Viewer/search-index.json", get(|| async { CORPUS }))
        .route("/site/Docs/Guides/{file}", get(guide))
        .route("/Docs/Manuals/manual.pdf", get(|| async { "%PDF-1.4" }));
    app = if with_generated {
        app.route("/api/generated-docs", get(|| async { GENERATED }))
    } else {
        app.route(
            "/api/generated-docs",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/site/Viewer", addr)
}

#[tokio::test]
async fn test_http_catalog_with_supplemental() {
    let base = start(true).await;
    let ctx = AppContext::connect(Config::with_base(base)).await.unwrap();

    assert_eq!(ctx.catalog().len(), 3);
    assert_eq!(ctx.repositories(), ["Docs", "Generated"]);
    assert_eq!(
        ctx.catalog()["Docs/Guides/setup guide.md"].last_modified,
        "1717171717"
    );
    assert!(ctx.search_engine().is_ready());

    // Headings given as a list are searchable.
    let results = ctx.search("configure").unwrap();
    assert_eq!(results[0].entry.id, 7);
}

#[tokio::test]
async fn test_http_supplemental_error_is_skipped() {
    let base = start(false).await;
    let ctx = AppContext::connect(Config::with_base(base)).await.unwrap();
    assert_eq!(ctx.catalog().len(), 2);
}

#[tokio::test]
async fn test_http_markdown_with_encoded_path() {
    let base = start(true).await;
    let config = Config::with_base(base);
    let ctx = AppContext::connect(config.clone()).await.unwrap();
    let path = "Docs/Guides/setup guide.md";
    let doc = ctx.catalog()[path].clone();

    let rendered = render_document(ctx.fetcher().as_ref(), &config, path, &doc).await;
    match rendered.view.content {
        DocumentContent::Markdown { html, loaded_from } => {
            assert_eq!(loaded_from, "../Docs/Guides/setup guide.md");
            assert!(html.contains("line one<br />"), "html: {}", html);
        }
        other => panic!("unexpected content: {:?}", other),
    }
}

#[tokio::test]
async fn test_http_pdf_probe() {
    let base = start(true).await;
    let config = Config::with_base(base);
    let ctx = AppContext::connect(config.clone()).await.unwrap();
    let path = "Docs/Manuals/manual.pdf";
    let doc = ctx.catalog()[path].clone();

    let rendered = render_document(ctx.fetcher().as_ref(), &config, path, &doc).await;
    assert!(rendered.notice.is_none());
    assert_eq!(
        rendered.view.content,
        DocumentContent::Pdf {
            src: "/Docs/Manuals/manual.pdf".to_string()
        }
    );
}
