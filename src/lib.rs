//! Graft: Folder-to-Page-Tree Mirroring
//!
//! Mirrors a local directory tree onto a hierarchical remote document store:
//! directories become container pages, files become leaf pages holding either
//! chunked text content or an external file reference.

pub mod chunk;
pub mod classify;
pub mod config;
pub mod error;
pub mod fs;
pub mod logging;
pub mod remote;
pub mod sync;
pub mod tooling;
pub mod types;
