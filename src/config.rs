use anyhow::{Context, Result};
use docs_viewer_core::markdown::DEFAULT_PLANTUML_SERVER;
use docs_viewer_core::search::FieldWeights;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub sources: SourcesConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

/// Where the viewer's resources live.
///
/// `base` is either an `http(s)://` URL or a local directory; every other
/// reference resolves against it with URL semantics, so `../x` climbs out of
/// the base and `/x` starts from the root.
#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    pub base: String,
    #[serde(default = "default_catalog")]
    pub catalog: String,
    #[serde(default = "default_supplemental")]
    pub supplemental: Option<String>,
    #[serde(default = "default_search_index")]
    pub search_index: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_catalog() -> String {
    "../documents-available.json".to_string()
}
fn default_supplemental() -> Option<String> {
    Some("/api/generated-docs".to_string())
}
fn default_search_index() -> Option<String> {
    Some("search-index.json".to_string())
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub weights: FieldWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            limit: None,
            weights: FieldWeights::default(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default = "default_plantuml_server")]
    pub plantuml_server: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            plantuml_server: default_plantuml_server(),
        }
    }
}

fn default_plantuml_server() -> String {
    DEFAULT_PLANTUML_SERVER.to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ThemeConfig {
    /// JSON state file holding the theme preference. Defaults to
    /// `<config dir>/docs-viewer/state.json`.
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Configuration pointing at a base with every other setting defaulted.
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            server: ServerConfig::default(),
            sources: SourcesConfig {
                base: base.into(),
                catalog: default_catalog(),
                supplemental: default_supplemental(),
                search_index: default_search_index(),
                timeout_secs: default_timeout_secs(),
            },
            search: SearchConfig::default(),
            render: RenderConfig::default(),
            theme: ThemeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if config.sources.base.trim().is_empty() {
        anyhow::bail!("sources.base must not be empty");
    }

    if config.sources.catalog.trim().is_empty() {
        anyhow::bail!("sources.catalog must not be empty");
    }

    if config.sources.timeout_secs == 0 {
        anyhow::bail!("sources.timeout_secs must be > 0");
    }

    if config.search.limit == Some(0) {
        anyhow::bail!("search.limit must be >= 1 when set");
    }

    let w = &config.search.weights;
    for (name, value) in [
        ("title", w.title),
        ("headings", w.headings),
        ("summary", w.summary),
        ("category", w.category),
        ("content", w.content),
    ] {
        if !value.is_finite() || value < 0.0 {
            anyhow::bail!("search.weights.{} must be a finite number >= 0", name);
        }
    }

    Ok(())
}
