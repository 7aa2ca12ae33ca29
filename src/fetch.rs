//! Resource fetching.
//!
//! Every resource the viewer reads (catalog, supplemental listing, search
//! corpus, document content) goes through the [`Fetcher`] trait. References
//! are resolved against a base with URL semantics: `../x` climbs out of the
//! base, `/x` starts from the root of the host. A local directory has no
//! host, so there `/x` starts from the site root (the base's parent).
//! Absolute `http(s)://` and `file://` references are used as they are.
//!
//! [`SourceFetcher`] handles `http(s)://` bases with `reqwest` and local
//! directories through `file://` URLs read with `tokio::fs`.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use docs_viewer_core::render::encode_path;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;

/// Where a reference resolves, relative to the site root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Inside the site root; holds the percent-encoded root-relative path.
    Site(String),
    /// Anywhere else.
    External(Url),
}

/// Reads raw bytes for a reference.
///
/// Implementations return `Err` for network failures, non-success statuses,
/// and missing files alike; callers decide which failures are fatal.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>>;

    /// Resolve a reference without fetching it. `None` when it cannot be
    /// resolved at all.
    fn locate(&self, reference: &str) -> Option<Location>;
}

/// Fetch a reference and decode it as JSON.
pub async fn fetch_json<T: DeserializeOwned>(fetcher: &dyn Fetcher, reference: &str) -> Result<T> {
    let bytes = fetcher.fetch(reference).await?;
    serde_json::from_slice(&bytes).with_context(|| format!("Invalid JSON in {}", reference))
}

/// Fetch a reference and decode it as UTF-8 text (lossy).
pub async fn fetch_text(fetcher: &dyn Fetcher, reference: &str) -> Result<String> {
    let bytes = fetcher.fetch(reference).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Fetcher rooted at an HTTP URL or a local directory.
pub struct SourceFetcher {
    base: Url,
    /// Parent of the base; the catalog and workspace files live under it.
    root: Url,
    client: reqwest::Client,
}

impl SourceFetcher {
    pub fn new(base: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        let base = parse_base(base)?;
        let root = base.join("../").context("Base has no parent")?;
        Ok(Self { base, root, client })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Resolve a reference against the base, percent-encoding each segment.
    pub fn resolve(&self, reference: &str) -> Result<Url> {
        if let Some(url) = absolute_url(reference) {
            return Ok(url);
        }
        let encoded = encode_path(reference);
        let joined = match (self.base.scheme(), encoded.strip_prefix('/')) {
            ("file", Some(rest)) => self.root.join(rest),
            _ => self.base.join(&encoded),
        };
        joined.with_context(|| format!("Invalid reference: {}", reference))
    }

    /// Root-relative path of `url`, or `None` when it lies outside the root.
    fn site_path(&self, url: &Url) -> Option<String> {
        if url.scheme() != self.root.scheme()
            || url.host() != self.root.host()
            || url.port_or_known_default() != self.root.port_or_known_default()
        {
            return None;
        }
        url.path()
            .strip_prefix(self.root.path())
            .map(str::to_string)
    }
}

fn absolute_url(reference: &str) -> Option<Url> {
    Url::parse(reference)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https" | "file"))
}

/// Interpret `base` as a URL when it has an http, https or file scheme,
/// otherwise as a directory path.
fn parse_base(base: &str) -> Result<Url> {
    if let Ok(url) = Url::parse(base) {
        if matches!(url.scheme(), "http" | "https" | "file") {
            return Ok(with_trailing_slash(url));
        }
    }

    let dir = Path::new(base);
    let absolute = std::fs::canonicalize(dir)
        .with_context(|| format!("Base directory does not exist: {}", dir.display()))?;
    Url::from_directory_path(&absolute)
        .map_err(|_| anyhow::anyhow!("Base is not a usable directory: {}", absolute.display()))
}

/// Without a trailing slash, `join` would replace the last base segment.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait]
impl Fetcher for SourceFetcher {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        let url = self.resolve(reference)?;
        match url.scheme() {
            "http" | "https" => {
                let resp = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .with_context(|| format!("Request failed: {}", url))?;
                if !resp.status().is_success() {
                    bail!("{} returned {}", url, resp.status());
                }
                let body = resp
                    .bytes()
                    .await
                    .with_context(|| format!("Failed to read body of {}", url))?;
                Ok(body.to_vec())
            }
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| anyhow::anyhow!("Not a local path: {}", url))?;
                tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))
            }
            other => bail!("Unsupported scheme '{}' in {}", other, url),
        }
    }

    fn locate(&self, reference: &str) -> Option<Location> {
        let url = self.resolve(reference).ok()?;
        Some(match self.site_path(&url) {
            Some(path) => Location::Site(path),
            None => Location::External(url),
        })
    }
}
