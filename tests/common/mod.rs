#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const CATALOG: &str = r#"{
    "A/B/x.md": {"repository": "R1", "relativePath": "B/x.md", "workspaceRelativePath": "A/B/x.md", "fullPath": "/work/A/B/x.md", "size": 2048, "lastModified": "2024-01-01"},
    "A/B/spec.docx": {"repository": "R1", "relativePath": "B/spec.docx", "workspaceRelativePath": "A/B/spec.docx", "fullPath": "/work/A/B/spec.docx", "size": 4096, "lastModified": "2024-01-03"},
    "A/C/y.pdf": {"repository": "R2", "relativePath": "C/y.pdf", "workspaceRelativePath": "A/C/y.pdf", "fullPath": "/work/A/C/y.pdf", "size": 1536, "lastModified": "2024-01-02"}
}"#;

pub const CORPUS: &str = r#"[
    {"id": 1, "title": "Setup Guide", "summary": "how to install", "category": "guides", "path": "A/B/x.md"},
    {"id": 2, "title": "Release Notes", "summary": "what changed", "content": "installer fixes", "path": "A/C/y.pdf"}
]"#;

pub const MARKDOWN: &str = "# Hello\n\nSee the *guide*.\n\n```mermaid\ngraph TD; A-->B\n```\n";

/// A site laid out like a published viewer:
///
/// ```text
/// root/
///   documents-available.json
///   Viewer/search-index.json      <- base
///   A/B/x.md
///   config/docview.toml
/// ```
pub struct Site {
    pub tmp: TempDir,
}

impl Site {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();

        fs::write(root.join("documents-available.json"), CATALOG).unwrap();
        fs::create_dir_all(root.join("Viewer")).unwrap();
        fs::write(root.join("Viewer/search-index.json"), CORPUS).unwrap();
        fs::create_dir_all(root.join("A/B")).unwrap();
        fs::write(root.join("A/B/x.md"), MARKDOWN).unwrap();
        fs::create_dir_all(root.join("config")).unwrap();

        let site = Self { tmp };
        site.write_config("");
        site
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn base(&self) -> PathBuf {
        self.root().join("Viewer")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("config/docview.toml")
    }

    pub fn state_file(&self) -> PathBuf {
        self.root().join("state.json")
    }

    /// Rewrite the config; `sources_extra` lands inside `[sources]`.
    pub fn write_config(&self, sources_extra: &str) {
        let content = format!(
            r#"[server]
bind = "127.0.0.1:0"

[sources]
base = "{}"
{}

[theme]
state_file = "{}"

[logging]
level = "warn"
"#,
            self.base().display(),
            sources_extra,
            self.state_file().display()
        );
        fs::write(self.config_path(), content).unwrap();
    }
}
