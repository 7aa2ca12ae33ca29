//! Persisted light/dark theme preference.
//!
//! The preference lives under the `docs-viewer-theme` key of a small JSON
//! state file. Other keys in that file are preserved on write. A missing or
//! unreadable file means the light theme.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::ThemeConfig;

pub const THEME_KEY: &str = "docs-viewer-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Theme name handed to the client-side diagram engine.
    pub fn diagram_theme(self) -> &'static str {
        match self {
            Theme::Light => "default",
            Theme::Dark => "dark",
        }
    }

    /// Icon for the toggle button: it shows the theme you would switch to.
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Theme::Light => "🌙",
            Theme::Dark => "☀️",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let path = match &config.state_file {
            Some(p) => p.clone(),
            None => dirs::config_dir()
                .context("Could not determine the platform config directory")?
                .join("docs-viewer")
                .join("state.json"),
        };
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Theme {
        self.read_state()
            .ok()
            .and_then(|state| {
                state
                    .get(THEME_KEY)
                    .and_then(|v| v.as_str())
                    .and_then(Theme::parse)
            })
            .unwrap_or_default()
    }

    pub fn save(&self, theme: Theme) -> Result<()> {
        let mut state = self.read_state().unwrap_or_default();
        state.insert(
            THEME_KEY.to_string(),
            serde_json::Value::String(theme.as_str().to_string()),
        );

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let body = serde_json::to_string_pretty(&state)?;
        std::fs::write(&self.path, body)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        tracing::debug!(theme = theme.as_str(), path = %self.path.display(), "theme saved");
        Ok(())
    }

    /// Flip the stored theme and return the new one.
    pub fn toggle(&self) -> Result<Theme> {
        let next = self.load().toggled();
        self.save(next)?;
        Ok(next)
    }

    fn read_state(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// CLI entry point for `docview theme`.
pub fn run_theme(config: &ThemeConfig, action: Option<&str>) -> Result<()> {
    let store = ThemeStore::from_config(config)?;
    let theme = match action {
        None | Some("show") => store.load(),
        Some("toggle") => store.toggle()?,
        Some(value) => {
            let theme = Theme::parse(value).with_context(|| {
                format!("Unknown theme action '{}'. Use show, toggle, light or dark.", value)
            })?;
            store.save(theme)?;
            theme
        }
    };
    println!("{} {}", theme.toggle_icon(), theme.as_str());
    Ok(())
}
