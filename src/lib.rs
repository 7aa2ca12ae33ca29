//! # Docs Viewer
//!
//! Browse, filter, search and render a documentation catalog from the
//! command line or over a small JSON HTTP API.
//!
//! A static manifest (`documents-available.json`) lists every document by
//! path, optionally extended by a supplemental listing. From it the viewer
//! derives a folder tree, topic groups and repository list; a separately
//! built search corpus powers ranked full-text search; selected documents
//! are rendered as HTML (markdown), embedded (PDF) or described (everything
//! else).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  Fetcher    │──▶│   Loader     │──▶│  AppContext  │
//! │ http / file │   │ catalog+index│   │ filter/tree/ │
//! └─────────────┘   └──────────────┘   │ search/view  │
//!                                      └──────┬───────┘
//!                        ┌────────────────────┤
//!                        ▼                    ▼
//!                  ┌──────────┐         ┌──────────┐
//!                  │   CLI    │         │   HTTP   │
//!                  │(docview) │         │  (axum)  │
//!                  └──────────┘         └──────────┘
//! ```
//!
//! The pure pieces (catalog merge, filters, tree, topics, search ranking,
//! highlighting, markdown rendering) live in `docs-viewer-core`.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`fetch`] | Resource fetching over HTTP or the filesystem |
//! | [`loader`] | Catalog and search corpus loading |
//! | [`context`] | Session state and its operations |
//! | [`document`] | Document rendering with candidate fallback |
//! | [`debounce`] | Search input debouncing |
//! | [`notice`] | Transient notices |
//! | [`theme`] | Persisted theme preference |
//! | [`browse`] | `tree`, `topics`, `repos` commands |
//! | [`search`] | `search` command |
//! | [`server`] | HTTP server |
//! | [`logging`] | `tracing` subscriber setup |

pub mod browse;
pub mod config;
pub mod context;
pub mod debounce;
pub mod document;
pub mod fetch;
pub mod loader;
pub mod logging;
pub mod notice;
pub mod search;
pub mod server;
pub mod theme;
