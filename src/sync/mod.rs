//! Sync Engine
//!
//! Depth-first pre-order traversal that mirrors a local directory tree onto
//! the remote page tree. Strictly sequential: a parent page is created
//! before any of its children, siblings are processed in sorted order, and
//! remote calls are awaited one at a time.
//!
//! Failures are isolated per entry: a failed create or append skips that
//! entry (and its subtree) while siblings proceed. Only configuration
//! problems and cancellation abort the run.

pub mod report;

use crate::chunk::{batch, chunk};
use crate::classify::{classify, NodeClass};
use crate::config::GraftConfig;
use crate::error::SyncError;
use crate::fs::{self, FsEntry};
use crate::remote::{Block, PageTreeClient};
use futures::future::{BoxFuture, FutureExt};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use report::{format_report_text, SkippedEntry, SyncReport};

/// Cooperative cancellation signal, checked between entries.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Engine knobs, derived from configuration.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub max_chunk_chars: usize,
    pub max_blocks_per_append: usize,
    pub text_extensions: Vec<String>,
    pub hidden_prefix: String,
    pub external_file_base_url: String,
}

impl SyncOptions {
    pub fn from_config(config: &GraftConfig) -> Self {
        Self {
            max_chunk_chars: config.limits.max_chunk_chars,
            max_blocks_per_append: config.limits.max_blocks_per_append,
            text_extensions: config.rules.text_extensions.clone(),
            hidden_prefix: config.rules.hidden_prefix.clone(),
            external_file_base_url: config.rules.external_file_base_url.clone(),
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from_config(&GraftConfig::default())
    }
}

/// Mirrors a local directory tree under an existing remote page.
pub struct SyncEngine<'a, C: PageTreeClient> {
    client: &'a C,
    options: SyncOptions,
    cancel: CancelFlag,
}

impl<'a, C: PageTreeClient> SyncEngine<'a, C> {
    pub fn new(client: &'a C, options: SyncOptions) -> Self {
        Self {
            client,
            options,
            cancel: CancelFlag::new(),
        }
    }

    /// Replace the engine's cancellation flag (e.g. one armed by a signal
    /// handler).
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Mirror `root` under the existing remote page `dest_parent_id`.
    ///
    /// An invalid root path is fatal before any remote call. Per-entry
    /// failures are recorded in the returned report, not raised.
    pub async fn run(&self, root: &Path, dest_parent_id: &str) -> Result<SyncReport, SyncError> {
        if !root.is_dir() {
            return Err(SyncError::Config(format!(
                "'{}' is not a valid directory",
                root.display()
            )));
        }
        info!(root = %root.display(), parent = dest_parent_id, "sync started");
        let mut report = SyncReport::default();
        self.sync_dir(root, dest_parent_id, &mut report).await?;
        info!(
            pages = report.pages_created(),
            blocks = report.blocks_appended,
            skipped = report.entries_skipped.len(),
            "sync completed"
        );
        Ok(report)
    }

    /// Process one task: the children of `dir` under remote page `parent_id`.
    ///
    /// Boxed because the traversal recurses through an async call.
    fn sync_dir<'f>(
        &'f self,
        dir: &'f Path,
        parent_id: &'f str,
        report: &'f mut SyncReport,
    ) -> BoxFuture<'f, Result<(), SyncError>> {
        async move {
            let entries = match fs::list_dir(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    report.record_skip(dir, e.to_string());
                    return Ok(());
                }
            };
            for entry in entries {
                if self.cancel.is_cancelled() {
                    warn!("cancellation observed, aborting traversal");
                    return Err(SyncError::Cancelled);
                }
                if self.is_hidden(&entry.name) {
                    debug!(name = entry.name.as_str(), "skipping hidden entry");
                    continue;
                }
                match classify(&entry, &self.options.text_extensions) {
                    NodeClass::Container => self.sync_container(&entry, parent_id, report).await?,
                    NodeClass::TextLeaf => self.sync_text_leaf(&entry, parent_id, report).await,
                    NodeClass::OpaqueLeaf => self.sync_opaque_leaf(&entry, parent_id, report).await,
                }
            }
            Ok(())
        }
        .boxed()
    }

    async fn sync_container(
        &self,
        entry: &FsEntry,
        parent_id: &str,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let page_id = match self.client.create_page(parent_id, &entry.name).await {
            Ok(id) => id,
            Err(e) => {
                report.record_skip(&entry.path, format!("create container page failed: {}", e));
                return Ok(());
            }
        };
        report.containers_created += 1;
        info!(path = %entry.path.display(), page = page_id.as_str(), "container page created");
        self.sync_dir(&entry.path, &page_id, report).await
    }

    async fn sync_text_leaf(&self, entry: &FsEntry, parent_id: &str, report: &mut SyncReport) {
        // Degrade, don't abort: the classifier already committed this file
        // to a page, so unreadable content becomes a placeholder.
        let content = match fs::read_text(&entry.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %entry.path.display(), error = %e, "substituting placeholder for unreadable file");
                report.placeholders_substituted += 1;
                format!("Could not read file {}", entry.name)
            }
        };
        let title = entry.stem();
        let page_id = match self.client.create_page(parent_id, &title).await {
            Ok(id) => id,
            Err(e) => {
                report.record_skip(&entry.path, format!("create page failed: {}", e));
                return;
            }
        };
        report.text_pages_created += 1;
        info!(path = %entry.path.display(), page = page_id.as_str(), "text page created");

        let blocks: Vec<Block> = chunk(&content, self.options.max_chunk_chars)
            .into_iter()
            .map(Block::paragraph)
            .collect();
        // Empty content produces no batches and therefore no append call.
        for blocks in batch(blocks, self.options.max_blocks_per_append) {
            match self.client.append_blocks(&page_id, &blocks).await {
                Ok(()) => report.blocks_appended += blocks.len() as u64,
                Err(e) => {
                    // Remaining batches are abandoned; partial content on
                    // the page is left as-is.
                    report.record_skip(&entry.path, format!("append failed: {}", e));
                    return;
                }
            }
        }
    }

    async fn sync_opaque_leaf(&self, entry: &FsEntry, parent_id: &str, report: &mut SyncReport) {
        let title = entry.stem();
        let page_id = match self.client.create_page(parent_id, &title).await {
            Ok(id) => id,
            Err(e) => {
                report.record_skip(&entry.path, format!("create page failed: {}", e));
                return;
            }
        };
        report.file_pages_created += 1;
        info!(path = %entry.path.display(), page = page_id.as_str(), "file page created");

        let url = format!(
            "{}/{}",
            self.options.external_file_base_url.trim_end_matches('/'),
            entry.name
        );
        let blocks = vec![Block::external_file(url)];
        match self.client.append_blocks(&page_id, &blocks).await {
            Ok(()) => report.blocks_appended += 1,
            Err(e) => report.record_skip(&entry.path, format!("append failed: {}", e)),
        }
    }

    fn is_hidden(&self, name: &str) -> bool {
        let prefix = &self.options.hidden_prefix;
        !prefix.is_empty() && name.starts_with(prefix.as_str())
    }
}
