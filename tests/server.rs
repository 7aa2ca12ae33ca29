mod common;

use common::Site;
use docs_viewer::config::load_config;
use docs_viewer::server::{build_state, router};
use serde_json::{json, Value};
use std::time::Duration;

/// Serve the router on an ephemeral port and return its base URL.
async fn start(site: &Site) -> String {
    let config = load_config(&site.config_path()).unwrap();
    let state = build_state(&config).await.unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn get_json(url: &str) -> (u16, Value) {
    let resp = reqwest::get(url).await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn test_health() {
    let site = Site::new();
    let base = start(&site).await;
    let (status, body) = get_json(&format!("{}/health", base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_catalog_endpoints() {
    let site = Site::new();
    let base = start(&site).await;

    let (_, docs) = get_json(&format!("{}/api/documents", base)).await;
    assert_eq!(docs.as_object().unwrap().len(), 3);
    assert_eq!(docs["A/B/x.md"]["repository"], "R1");

    let (_, repos) = get_json(&format!("{}/api/repositories", base)).await;
    assert_eq!(repos["repositories"], json!(["R1", "R2"]));

    let (_, topics) = get_json(&format!("{}/api/topics", base)).await;
    assert_eq!(topics["topics"][0]["name"], "B");
    assert_eq!(topics["topics"][0]["count"], 2);
}

#[tokio::test]
async fn test_tree_with_filters() {
    let site = Site::new();
    let base = start(&site).await;

    let (status, tree) = get_json(&format!("{}/api/tree?repository=R1&fileType=.md", base)).await;
    assert_eq!(status, 200);
    assert_eq!(tree["documentCount"], 1);
    let a = &tree["items"][0];
    assert_eq!(a["name"], "A");
    assert_eq!(a["kind"], "folder");
    assert_eq!(a["expanded"], true);
    let x = &a["children"][0]["children"][0];
    assert_eq!(x["name"], "x.md");
    assert_eq!(x["kind"], "file");
    assert_eq!(x["path"], "A/B/x.md");
    assert_eq!(x["icon"], "📝");

    // Query overrides are not stored.
    let (_, tree) = get_json(&format!("{}/api/tree", base)).await;
    assert_eq!(tree["documentCount"], 3);
}

#[tokio::test]
async fn test_set_filter_is_stored() {
    let site = Site::new();
    let base = start(&site).await;
    let client = reqwest::Client::new();

    let tree: Value = client
        .put(format!("{}/api/filter", base))
        .json(&json!({"repository": "R2"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tree["documentCount"], 1);

    let (_, state) = get_json(&format!("{}/api/state", base)).await;
    assert_eq!(state["filter"]["repository"], "R2");
    assert_eq!(state["filter"]["fileType"], "all");
    assert_eq!(state["visibleCount"], 1);
}

#[tokio::test]
async fn test_search() {
    let site = Site::new();
    let base = start(&site).await;

    let (status, view) = get_json(&format!("{}/api/search?q=install", base)).await;
    assert_eq!(status, 200);
    assert_eq!(view["count"], 2);
    let first = &view["results"][0];
    assert_eq!(first["id"], 1);
    assert_eq!(
        first["summary"],
        json!([
            {"text": "how to ", "highlighted": false},
            {"text": "install", "highlighted": true}
        ])
    );

    let (_, view) = get_json(&format!("{}/api/search?q=i", base)).await;
    assert_eq!(view["count"], 0);

    let (status, body) = get_json(&format!("{}/api/search", base)).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_search_not_ready() {
    let site = Site::new();
    site.write_config("search_index = \"\"");
    let base = start(&site).await;

    let (status, body) = get_json(&format!("{}/api/search?q=install", base)).await;
    assert_eq!(status, 503);
    assert_eq!(body["error"]["code"], "search_not_ready");

    // Everything else still works.
    let (status, _) = get_json(&format!("{}/api/tree", base)).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_debounced_input_switches_views() {
    let site = Site::new();
    let base = start(&site).await;
    let client = reqwest::Client::new();

    for text in ["in", "inst", "install"] {
        let resp = client
            .post(format!("{}/api/input", base))
            .json(&json!({"text": text}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 202);
    }

    // The substring filter applies at once: no path contains "install".
    let (_, state) = get_json(&format!("{}/api/state", base)).await;
    assert_eq!(state["visibleCount"], 0);

    tokio::time::sleep(Duration::from_millis(600)).await;
    let (_, state) = get_json(&format!("{}/api/state", base)).await;
    assert_eq!(state["mode"], "results");
    assert_eq!(state["query"], "install");
    assert_eq!(state["search"]["count"], 2);

    client
        .post(format!("{}/api/input", base))
        .json(&json!({"text": ""}))
        .send()
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;
    let (_, state) = get_json(&format!("{}/api/state", base)).await;
    assert_eq!(state["mode"], "hierarchy");
    assert_eq!(state["visibleCount"], 3);
    assert!(state["search"].is_null());
}

#[tokio::test]
async fn test_view_markdown() {
    let site = Site::new();
    let base = start(&site).await;

    let (status, view) = get_json(&format!("{}/api/view/A/B/x.md", base)).await;
    assert_eq!(status, 200);
    assert_eq!(view["breadcrumb"], json!(["A", "B", "x.md"]));
    assert_eq!(view["fullPath"], "/work/A/B/x.md");
    assert_eq!(view["content"]["type"], "markdown");
    assert_eq!(view["content"]["loadedFrom"], "../A/B/x.md");
    assert!(view["content"]["html"]
        .as_str()
        .unwrap()
        .contains("<h1>Hello</h1>"));

    let (_, state) = get_json(&format!("{}/api/state", base)).await;
    assert_eq!(state["currentDocument"], "A/B/x.md");
}

#[tokio::test]
async fn test_view_docx_unsupported() {
    let site = Site::new();
    let base = start(&site).await;

    let (status, view) = get_json(&format!("{}/api/view/A/B/spec.docx", base)).await;
    assert_eq!(status, 200);
    assert_eq!(view["content"]["type"], "unsupported");
    assert_eq!(view["content"]["extension"], "docx");
    assert_eq!(view["content"]["fullPath"], "/work/A/B/spec.docx");
}

#[tokio::test]
async fn test_view_unreachable_pdf() {
    let site = Site::new();
    let base = start(&site).await;

    let (status, view) = get_json(&format!("{}/api/view/A/C/y.pdf", base)).await;
    assert_eq!(status, 200);
    assert_eq!(view["content"]["type"], "info");
    assert_eq!(view["content"]["sizeKb"], "1.50");

    let (_, notices) = get_json(&format!("{}/api/notices", base)).await;
    let messages: Vec<&str> = notices
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| n["level"] == "error")
        .map(|n| n["message"].as_str().unwrap())
        .collect();
    assert!(messages.contains(&"Failed to load PDF. File may not be accessible."));
}

#[tokio::test]
async fn test_view_unknown_document() {
    let site = Site::new();
    let base = start(&site).await;

    let (status, body) = get_json(&format!("{}/api/view/nope.md", base)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "not_found");

    let (_, notices) = get_json(&format!("{}/api/notices", base)).await;
    assert!(notices
        .as_array()
        .unwrap()
        .iter()
        .any(|n| n["message"] == "Document not found"));

    let resp = reqwest::Client::new()
        .delete(format!("{}/api/notices", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);
    let (_, notices) = get_json(&format!("{}/api/notices", base)).await;
    assert_eq!(notices, json!([]));
}

#[tokio::test]
async fn test_path_actions() {
    let site = Site::new();
    let base = start(&site).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/actions/copy", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    get_json(&format!("{}/api/view/A/B/x.md", base)).await;
    let body: Value = client
        .post(format!("{}/api/actions/reveal", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["fullPath"], "/work/A/B/x.md");

    let resp = client
        .post(format!("{}/api/actions/open", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn test_refresh_picks_up_new_documents() {
    let site = Site::new();
    let base = start(&site).await;

    let extra = common::CATALOG.replacen(
        '{',
        r#"{"A/D/new.md": {"repository": "R3", "relativePath": "D/new.md"},"#,
        1,
    );
    std::fs::write(site.root().join("documents-available.json"), extra).unwrap();

    let body: Value = reqwest::Client::new()
        .post(format!("{}/api/refresh", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["documentCount"], 4);

    let (_, notices) = get_json(&format!("{}/api/notices", base)).await;
    assert!(notices
        .as_array()
        .unwrap()
        .iter()
        .any(|n| n["message"] == "Documents refreshed successfully"));
}

#[tokio::test]
async fn test_refresh_failure_keeps_catalog() {
    let site = Site::new();
    let base = start(&site).await;

    std::fs::remove_file(site.root().join("documents-available.json")).unwrap();
    let resp = reqwest::Client::new()
        .post(format!("{}/api/refresh", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "internal");

    let (_, docs) = get_json(&format!("{}/api/documents", base)).await;
    assert_eq!(docs.as_object().unwrap().len(), 3);
}

#[tokio::test]
async fn test_files_proxy() {
    let site = Site::new();
    let base = start(&site).await;

    let resp = reqwest::get(format!("{}/files/Viewer/search-index.json", base))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );

    let resp = reqwest::get(format!("{}/files/A/B/x.md", base)).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.unwrap(), common::MARKDOWN);

    let resp = reqwest::get(format!("{}/files/missing.md", base))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn test_files_stay_inside_site_root() {
    let site = Site::new();
    let outside = tempfile::TempDir::new().unwrap();
    std::fs::write(outside.path().join("secret.txt"), "TOP SECRET").unwrap();
    let outside_name = outside.path().file_name().unwrap().to_str().unwrap();
    let base = start(&site).await;

    let escapes = [
        format!("..%2F{}%2Fsecret.txt", outside_name),
        "..%2F..%2F..%2F..%2F..%2F..%2F..%2F..%2Fetc%2Fpasswd".to_string(),
        "Viewer%2F..%2F..%2F..%2F..%2F..%2F..%2F..%2Fetc%2Fpasswd".to_string(),
        "..%5C..%5C..%5C..%5Cetc%5Cpasswd".to_string(),
    ];
    for escape in escapes {
        let resp = reqwest::get(format!("{}/files/{}", base, escape))
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 404, "served {}", escape);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "not_found");
    }

    // Climbing back down inside the root is fine.
    let resp = reqwest::get(format!("{}/files/Viewer%2F..%2FA%2FB%2Fx.md", base))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn test_view_pdf_src_is_served() {
    let site = Site::new();
    std::fs::create_dir_all(site.root().join("A/C")).unwrap();
    std::fs::write(site.root().join("A/C/y.pdf"), "%PDF-1.4 test").unwrap();
    let base = start(&site).await;

    let (status, view) = get_json(&format!("{}/api/view/A/C/y.pdf", base)).await;
    assert_eq!(status, 200);
    assert_eq!(view["content"]["type"], "pdf");
    let src = view["content"]["src"].as_str().unwrap();
    assert_eq!(src, "/files/A/C/y.pdf");

    let resp = reqwest::get(format!("{}{}", base, src)).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "application/pdf"
    );
    assert_eq!(resp.text().await.unwrap(), "%PDF-1.4 test");
}

#[tokio::test]
async fn test_theme_toggle() {
    let site = Site::new();
    let base = start(&site).await;

    let (_, theme) = get_json(&format!("{}/api/theme", base)).await;
    assert_eq!(theme, json!({"theme": "light", "icon": "🌙", "diagramTheme": "default"}));

    let theme: Value = reqwest::Client::new()
        .post(format!("{}/api/theme/toggle", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(theme["theme"], "dark");
    assert_eq!(theme["diagramTheme"], "dark");

    let saved: Value =
        serde_json::from_str(&std::fs::read_to_string(site.state_file()).unwrap()).unwrap();
    assert_eq!(saved["docs-viewer-theme"], "dark");
}
