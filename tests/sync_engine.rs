//! Integration tests for the sync engine: traversal order, chunk/batch
//! behavior against a recording client, and per-entry failure isolation.

use async_trait::async_trait;
use graft::error::RemoteError;
use graft::remote::{Block, PageTreeClient};
use graft::sync::{SyncEngine, SyncOptions};
use graft::types::PageId;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    CreatePage {
        parent: String,
        title: String,
        id: String,
    },
    /// Recorded for every append attempt, including ones that then fail.
    AppendBlocks {
        page: String,
        blocks: Vec<Block>,
    },
}

/// Test double for the page-tree service. Records calls in order and can be
/// told to reject creates or appends for pages with specific titles.
#[derive(Default)]
struct RecordingClient {
    calls: Mutex<Vec<Call>>,
    titles: Mutex<HashMap<String, String>>,
    next_id: AtomicU64,
    fail_create_titles: HashSet<String>,
    fail_append_titles: HashSet<String>,
}

impl RecordingClient {
    fn new() -> Self {
        Self::default()
    }

    fn fail_create(mut self, title: &str) -> Self {
        self.fail_create_titles.insert(title.to_string());
        self
    }

    fn fail_append(mut self, title: &str) -> Self {
        self.fail_append_titles.insert(title.to_string());
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn rejected() -> RemoteError {
        RemoteError::Api {
            status: 400,
            message: "rejected".to_string(),
        }
    }
}

#[async_trait]
impl PageTreeClient for RecordingClient {
    async fn create_page(&self, parent_id: &str, title: &str) -> Result<PageId, RemoteError> {
        if self.fail_create_titles.contains(title) {
            return Err(Self::rejected());
        }
        let id = format!("page-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        self.titles
            .lock()
            .unwrap()
            .insert(id.clone(), title.to_string());
        self.calls.lock().unwrap().push(Call::CreatePage {
            parent: parent_id.to_string(),
            title: title.to_string(),
            id: id.clone(),
        });
        Ok(id)
    }

    async fn append_blocks(&self, page_id: &str, blocks: &[Block]) -> Result<(), RemoteError> {
        assert!(!blocks.is_empty(), "append must never carry zero blocks");
        self.calls.lock().unwrap().push(Call::AppendBlocks {
            page: page_id.to_string(),
            blocks: blocks.to_vec(),
        });
        let title = self
            .titles
            .lock()
            .unwrap()
            .get(page_id)
            .cloned()
            .unwrap_or_default();
        if self.fail_append_titles.contains(&title) {
            return Err(Self::rejected());
        }
        Ok(())
    }
}

fn fixture() -> TempDir {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(temp.path().join("notes.md"), "a".repeat(3500)).unwrap();
    std::fs::create_dir(temp.path().join("imgs")).unwrap();
    std::fs::write(temp.path().join("imgs").join("photo.png"), [0u8, 1, 2]).unwrap();
    temp
}

#[tokio::test]
async fn mirrors_fixture_tree_in_sorted_order() {
    let temp = fixture();
    let client = RecordingClient::new();
    let engine = SyncEngine::new(&client, SyncOptions::default());

    let report = engine.run(temp.path(), "root-page").await.unwrap();

    let calls = client.calls();
    assert_eq!(calls.len(), 5);

    // "imgs" sorts before "notes.md"; the container is created before its
    // children, siblings follow in order.
    let Call::CreatePage { parent, title, id: imgs_id } = &calls[0] else {
        panic!("expected create, got {:?}", calls[0]);
    };
    assert_eq!((parent.as_str(), title.as_str()), ("root-page", "imgs"));

    let Call::CreatePage { parent, title, id: photo_id } = &calls[1] else {
        panic!("expected create, got {:?}", calls[1]);
    };
    assert_eq!((parent.as_str(), title.as_str()), (imgs_id.as_str(), "photo"));

    let Call::AppendBlocks { page, blocks } = &calls[2] else {
        panic!("expected append, got {:?}", calls[2]);
    };
    assert_eq!(page, photo_id);
    assert_eq!(
        blocks.as_slice(),
        [Block::external_file("https://example.com/files/photo.png")]
    );

    let Call::CreatePage { parent, title, id: notes_id } = &calls[3] else {
        panic!("expected create, got {:?}", calls[3]);
    };
    assert_eq!((parent.as_str(), title.as_str()), ("root-page", "notes"));

    // 3500 chars under a 2000-char block limit: two paragraphs, one batch.
    let Call::AppendBlocks { page, blocks } = &calls[4] else {
        panic!("expected append, got {:?}", calls[4]);
    };
    assert_eq!(page, notes_id);
    let lengths: Vec<usize> = blocks
        .iter()
        .map(|b| match b {
            Block::Paragraph { text } => text.chars().count(),
            other => panic!("expected paragraph, got {:?}", other),
        })
        .collect();
    assert_eq!(lengths, vec![2000, 1500]);

    assert_eq!(report.containers_created, 1);
    assert_eq!(report.text_pages_created, 1);
    assert_eq!(report.file_pages_created, 1);
    assert_eq!(report.blocks_appended, 3);
    assert!(report.entries_skipped.is_empty());
}

#[tokio::test]
async fn two_runs_produce_identical_call_sequences() {
    let temp = fixture();

    let first = RecordingClient::new();
    SyncEngine::new(&first, SyncOptions::default())
        .run(temp.path(), "root-page")
        .await
        .unwrap();

    let second = RecordingClient::new();
    SyncEngine::new(&second, SyncOptions::default())
        .run(temp.path(), "root-page")
        .await
        .unwrap();

    assert_eq!(first.calls(), second.calls());
}

#[tokio::test]
async fn container_create_failure_skips_subtree_but_not_siblings() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::create_dir(temp.path().join("bad")).unwrap();
    std::fs::write(temp.path().join("bad").join("inner.txt"), "hidden from run").unwrap();
    std::fs::create_dir(temp.path().join("good")).unwrap();
    std::fs::write(temp.path().join("zeta.txt"), "still synced").unwrap();

    let client = RecordingClient::new().fail_create("bad");
    let engine = SyncEngine::new(&client, SyncOptions::default());
    let report = engine.run(temp.path(), "root-page").await.unwrap();

    let titles: Vec<String> = client
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::CreatePage { title, .. } => Some(title),
            _ => None,
        })
        .collect();
    // Nothing under bad/ is visited; good and zeta still sync.
    assert_eq!(titles, vec!["good".to_string(), "zeta".to_string()]);

    assert_eq!(report.containers_created, 1);
    assert_eq!(report.text_pages_created, 1);
    assert_eq!(report.entries_skipped.len(), 1);
    assert!(report.entries_skipped[0].path.ends_with("bad"));
}

#[tokio::test]
async fn append_failure_abandons_remaining_batches_for_entry() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(temp.path().join("along.txt"), "x".repeat(100)).unwrap();
    std::fs::write(temp.path().join("bshort.txt"), "ok").unwrap();

    let mut options = SyncOptions::default();
    options.max_chunk_chars = 10;
    options.max_blocks_per_append = 2;

    // 100 chars -> 10 chunks -> 5 batches; the first append is rejected.
    let client = RecordingClient::new().fail_append("along");
    let engine = SyncEngine::new(&client, options);
    let report = engine.run(temp.path(), "root-page").await.unwrap();

    let calls = client.calls();
    let along_id = calls
        .iter()
        .find_map(|c| match c {
            Call::CreatePage { title, id, .. } if title == "along" => Some(id.clone()),
            _ => None,
        })
        .unwrap();
    let along_appends = calls
        .iter()
        .filter(|c| matches!(c, Call::AppendBlocks { page, .. } if *page == along_id))
        .count();
    assert_eq!(along_appends, 1);

    // The sibling after the failing entry is still fully synced.
    assert_eq!(report.text_pages_created, 2);
    assert_eq!(report.blocks_appended, 1);
    assert_eq!(report.entries_skipped.len(), 1);
    assert!(report.entries_skipped[0].path.ends_with("along.txt"));
}

#[tokio::test]
async fn unreadable_text_file_gets_placeholder_content() {
    let temp = tempfile::tempdir().unwrap();
    // Invalid UTF-8 makes the text read fail regardless of permissions.
    std::fs::write(temp.path().join("locked.txt"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

    let client = RecordingClient::new();
    let engine = SyncEngine::new(&client, SyncOptions::default());
    let report = engine.run(temp.path(), "root-page").await.unwrap();

    let calls = client.calls();
    assert!(matches!(
        &calls[0],
        Call::CreatePage { title, .. } if title == "locked"
    ));
    let Call::AppendBlocks { blocks, .. } = &calls[1] else {
        panic!("expected append, got {:?}", calls[1]);
    };
    assert_eq!(
        blocks.as_slice(),
        [Block::paragraph("Could not read file locked.txt")]
    );

    assert_eq!(report.placeholders_substituted, 1);
    assert!(report.entries_skipped.is_empty());
}

#[tokio::test]
async fn empty_text_file_creates_page_without_append() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(temp.path().join("empty.md"), "").unwrap();

    let client = RecordingClient::new();
    let engine = SyncEngine::new(&client, SyncOptions::default());
    let report = engine.run(temp.path(), "root-page").await.unwrap();

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(
        &calls[0],
        Call::CreatePage { title, .. } if title == "empty"
    ));
    assert_eq!(report.text_pages_created, 1);
    assert_eq!(report.blocks_appended, 0);
}

#[tokio::test]
async fn hidden_entries_are_excluded() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::create_dir(temp.path().join(".git")).unwrap();
    std::fs::write(temp.path().join(".git").join("config"), "x").unwrap();
    std::fs::write(temp.path().join(".env.txt"), "secret").unwrap();
    std::fs::write(temp.path().join("visible.txt"), "shown").unwrap();

    let client = RecordingClient::new();
    let engine = SyncEngine::new(&client, SyncOptions::default());
    let report = engine.run(temp.path(), "root-page").await.unwrap();

    let titles: Vec<String> = client
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::CreatePage { title, .. } => Some(title),
            _ => None,
        })
        .collect();
    assert_eq!(titles, vec!["visible".to_string()]);
    assert_eq!(report.pages_created(), 1);
}

#[tokio::test]
async fn custom_extension_set_changes_classification() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(temp.path().join("main.rs"), "fn main() {}").unwrap();
    std::fs::write(temp.path().join("notes.md"), "prose").unwrap();

    let mut options = SyncOptions::default();
    options.text_extensions = vec!["rs".to_string()];

    let client = RecordingClient::new();
    let engine = SyncEngine::new(&client, options);
    let report = engine.run(temp.path(), "root-page").await.unwrap();

    assert_eq!(report.text_pages_created, 1);
    assert_eq!(report.file_pages_created, 1);
    let has_external_md = client.calls().iter().any(|c| {
        matches!(
            c,
            Call::AppendBlocks { blocks, .. }
                if blocks.as_slice()
                    == [Block::external_file("https://example.com/files/notes.md")]
        )
    });
    assert!(has_external_md);
}
