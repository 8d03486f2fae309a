//! Core types for folder-to-page-tree mirroring.

/// PageId: opaque identifier of a remote page, assigned by the service
pub type PageId = String;
