//! # Docs Viewer Core
//!
//! Pure logic for Docs Viewer: catalog models, topic extraction, the filter
//! engine, the tree builder, full-text search with highlighting, and document
//! render dispatch.
//!
//! This crate contains no async runtime, network, or filesystem I/O. The
//! application crate fetches resources and feeds them in.

pub mod catalog;
pub mod filter;
pub mod highlight;
pub mod markdown;
pub mod models;
pub mod render;
pub mod search;
pub mod topics;
pub mod tree;
