//! Local filesystem capability
//!
//! Enumerates one directory level at a time in a deterministic order and
//! reads file content as UTF-8 text. The engine owns the recursion; this
//! module never descends on its own.

use crate::error::FsError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Kind of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// One entry of a directory listing
#[derive(Debug, Clone)]
pub struct FsEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl FsEntry {
    /// File extension without the leading dot, if any
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
    }

    /// File name with the extension stripped; falls back to the full name
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}

/// List the immediate children of `path`, sorted lexicographically by name.
pub fn list_dir(path: &Path) -> Result<Vec<FsEntry>, FsError> {
    let mut entries = Vec::new();
    let walker = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| FsError::ListDir {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        let kind = if entry.file_type().is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        entries.push(FsEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.into_path(),
            kind,
        });
    }
    Ok(entries)
}

/// Read a file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String, FsError> {
    std::fs::read_to_string(path).map_err(|e| FsError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })
}
