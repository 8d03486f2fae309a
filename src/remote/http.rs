//! HTTP implementation of the page-tree client.
//!
//! JSON-over-HTTP with bearer-token auth. Page creation posts to
//! `/v1/pages`; appends patch `/v1/blocks/{id}/children`. The client maps
//! non-2xx answers to `RemoteError::Api` and performs no retries.

use crate::error::RemoteError;
use crate::remote::{Block, PageTreeClient};
use crate::types::PageId;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpPageTreeClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpPageTreeClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn pages_url(&self) -> String {
        format!("{}/v1/pages", self.base_url)
    }

    fn children_url(&self, page_id: &str) -> String {
        format!("{}/v1/blocks/{}/children", self.base_url, page_id)
    }
}

#[async_trait]
impl PageTreeClient for HttpPageTreeClient {
    async fn create_page(&self, parent_id: &str, title: &str) -> Result<PageId, RemoteError> {
        let body = json!({
            "parent": { "page_id": parent_id },
            "properties": {
                "title": [{ "type": "text", "text": { "content": title } }]
            }
        });
        debug!(parent = parent_id, title, "creating page");
        let response = self
            .http
            .post(self.pages_url())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;
        let payload: Value = response.json().await?;
        payload
            .get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| RemoteError::InvalidResponse("create response missing page id".to_string()))
    }

    async fn append_blocks(&self, page_id: &str, blocks: &[Block]) -> Result<(), RemoteError> {
        let children: Vec<Value> = blocks.iter().map(block_json).collect();
        let body = json!({ "children": children });
        debug!(page = page_id, count = blocks.len(), "appending blocks");
        let response = self
            .http
            .patch(self.children_url(page_id))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Wire shape of one content block.
fn block_json(block: &Block) -> Value {
    match block {
        Block::Paragraph { text } => json!({
            "object": "block",
            "type": "paragraph",
            "paragraph": {
                "rich_text": [{ "type": "text", "text": { "content": text } }]
            }
        }),
        Block::ExternalFile { url } => json!({
            "object": "block",
            "type": "file",
            "file": { "type": "external", "external": { "url": url } }
        }),
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(RemoteError::Api {
        status: status.as_u16(),
        message,
    })
}
