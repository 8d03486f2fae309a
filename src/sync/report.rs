//! Run report: what a sync created, degraded, and skipped.

use serde::Serialize;
use std::path::Path;
use tracing::warn;

/// One entry excluded from the mirror, with the reason
#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: String,
}

/// Outcome counters for one sync run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub containers_created: u64,
    pub text_pages_created: u64,
    pub file_pages_created: u64,
    pub blocks_appended: u64,
    /// Text pages whose content was replaced by a placeholder because the
    /// source file could not be read
    pub placeholders_substituted: u64,
    pub entries_skipped: Vec<SkippedEntry>,
}

impl SyncReport {
    /// Total pages created across all node kinds.
    pub fn pages_created(&self) -> u64 {
        self.containers_created + self.text_pages_created + self.file_pages_created
    }

    pub(crate) fn record_skip(&mut self, path: &Path, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(path = %path.display(), reason = reason.as_str(), "entry skipped");
        self.entries_skipped.push(SkippedEntry {
            path: path.display().to_string(),
            reason,
        });
    }
}

/// Render a report as human-readable text.
pub fn format_report_text(report: &SyncReport) -> String {
    let mut out = String::new();
    out.push_str("Sync complete\n");
    out.push_str(&format!(
        "  Containers created:       {}\n",
        report.containers_created
    ));
    out.push_str(&format!(
        "  Text pages created:       {}\n",
        report.text_pages_created
    ));
    out.push_str(&format!(
        "  File pages created:       {}\n",
        report.file_pages_created
    ));
    out.push_str(&format!(
        "  Blocks appended:          {}\n",
        report.blocks_appended
    ));
    if report.placeholders_substituted > 0 {
        out.push_str(&format!(
            "  Placeholders substituted: {}\n",
            report.placeholders_substituted
        ));
    }
    out.push_str(&format!(
        "  Entries skipped:          {}\n",
        report.entries_skipped.len()
    ));
    for skipped in &report.entries_skipped {
        out.push_str(&format!("    - {}: {}\n", skipped.path, skipped.reason));
    }
    out
}
