//! # Docs Viewer CLI (`docview`)
//!
//! ## Usage
//!
//! ```bash
//! docview --config ./config/docview.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docview tree` | Print the (filtered) document tree |
//! | `docview topics` | Print documents grouped by topic |
//! | `docview repos` | List repositories with document counts |
//! | `docview search "<query>"` | Ranked full-text search |
//! | `docview show <path>` | Render one document |
//! | `docview serve` | Start the HTTP server |
//! | `docview theme [show\|toggle\|light\|dark]` | Read or change the theme |
//!
//! ## Examples
//!
//! ```bash
//! # Markdown files from one repository
//! docview tree --repository platform --file-type .md
//!
//! # Search with at most five results
//! docview search "install guide" --limit 5
//!
//! # Render a document and print its HTML
//! docview show platform/docs/setup.md --html
//! ```

use clap::{Parser, Subcommand};
use docs_viewer::{browse, config, document, logging, search, server, theme};
use docs_viewer_core::filter::{FilterState, ALL};
use std::path::PathBuf;

/// Docs Viewer: browse, filter, search and render a documentation catalog.
#[derive(Parser)]
#[command(name = "docview", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/docview.toml`. Only `[sources] base` is
    /// required; every other setting has a default.
    #[arg(long, global = true, default_value = "./config/docview.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the document tree as an indented outline.
    Tree {
        /// Only documents from this repository.
        #[arg(long, default_value = ALL)]
        repository: String,

        /// Comma-separated extension suffixes, e.g. `.md,.pdf`.
        #[arg(long, default_value = ALL)]
        file_type: String,

        /// Case-insensitive substring the path must contain.
        #[arg(long, default_value = "")]
        filter: String,
    },

    /// Print documents grouped by topic.
    Topics,

    /// List repositories and how many documents each holds.
    Repos,

    /// Search the full-text index.
    Search {
        query: String,

        /// Maximum number of results. Defaults to `[search] limit`.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Render one document by catalog path.
    Show {
        path: String,

        /// Print the rendered HTML of markdown documents.
        #[arg(long)]
        html: bool,
    },

    /// Start the HTTP server on `[server] bind`.
    Serve,

    /// Show or change the theme preference.
    Theme {
        /// `show` (default), `toggle`, `light` or `dark`.
        action: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = match config::load_config(&cli.config) {
        Ok(cfg) => cfg,
        // The theme only needs its state file, so it works without a config.
        Err(e) => match &cli.command {
            Commands::Theme { action } => {
                return theme::run_theme(&config::ThemeConfig::default(), action.as_deref());
            }
            _ => return Err(e),
        },
    };
    logging::init_logging(&cfg.logging);

    match cli.command {
        Commands::Tree {
            repository,
            file_type,
            filter,
        } => {
            let filter = FilterState {
                repository,
                file_type,
                search: filter.to_lowercase(),
            };
            browse::run_tree(&cfg, filter).await?;
        }
        Commands::Topics => {
            browse::run_topics(&cfg).await?;
        }
        Commands::Repos => {
            browse::run_repos(&cfg).await?;
        }
        Commands::Search { query, limit } => {
            search::run_search(&cfg, &query, limit).await?;
        }
        Commands::Show { path, html } => {
            document::run_show(&cfg, &path, html).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Theme { action } => {
            theme::run_theme(&cfg.theme, action.as_deref())?;
        }
    }

    Ok(())
}
