//! Node classification
//!
//! Decides what a filesystem entry becomes on the remote side: a container
//! page, a text leaf with inlined content, or an opaque leaf carrying an
//! external file reference. The text-extension set is configuration, not
//! law; the default mirrors common plain-text formats.

use crate::fs::{EntryKind, FsEntry};

/// Remote shape of a filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// Mirrors a directory; can hold child pages
    Container,
    /// Mirrors a recognized text file; content is inlined as paragraphs
    TextLeaf,
    /// Mirrors any other file; content is an external reference
    OpaqueLeaf,
}

/// Classify an entry against the configured text-extension set.
///
/// Extensions match case-insensitively and without the leading dot.
pub fn classify(entry: &FsEntry, text_extensions: &[String]) -> NodeClass {
    match entry.kind {
        EntryKind::Directory => NodeClass::Container,
        EntryKind::File => match entry.extension() {
            Some(ext) if text_extensions.iter().any(|t| t.eq_ignore_ascii_case(&ext)) => {
                NodeClass::TextLeaf
            }
            _ => NodeClass::OpaqueLeaf,
        },
    }
}

/// Default set of extensions treated as text
pub fn default_text_extensions() -> Vec<String> {
    ["txt", "md", "doc", "rtf"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
