//! Notion REST client, the [`TargetStore`] used by the CLI.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | child page | `POST /v1/pages` |
//! | block | `PATCH /v1/blocks/{parent}/children` (one block per call) |
//! | file | `POST /v1/file_uploads`, `POST /v1/file_uploads/{id}/send`, then a block referencing the upload |
//! | status icon | `PATCH /v1/pages/{id}` |
//!
//! Blocks are appended one at a time so every call returns the id of the
//! block it created, which nested content needs as its parent.

use crate::block::{Block, BlockKind};
use crate::config::MigrationConfig;
use crate::error::MigrationError;
use crate::output::UnitStatus;
use crate::pipeline::fetch::LocalResource;
use crate::target::{BlockHandle, TargetStore};
use crate::text::FormattedText;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Method;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

pub const NOTION_API: &str = "https://api.notion.com";
pub const NOTION_VERSION: &str = "2022-06-28";

/// Longest `content` Notion accepts in one rich-text object.
const MAX_TEXT_LEN: usize = 2000;

static PAGE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9a-f]{32})$").expect("valid page id regex"));

/// Extract a page id from a bare id, a dashed UUID or a Notion page URL.
pub fn parse_page_id(input: &str) -> Result<String, MigrationError> {
    let trimmed = input.trim();
    let path = trimmed.split(['?', '#']).next().unwrap_or_default();
    let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let compact = last.replace('-', "").to_ascii_lowercase();
    PAGE_ID
        .captures(&compact)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| MigrationError::InvalidConfig(format!("'{}' is not a Notion page id or URL", input)))
}

/// HTTP client for the Notion API.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    token: String,
    api_base: String,
}

impl NotionClient {
    pub fn new(token: impl Into<String>, config: &MigrationConfig) -> Result<Self, MigrationError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(MigrationError::InvalidConfig("Notion token is empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| MigrationError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            token,
            api_base: NOTION_API.to_string(),
        })
    }

    /// Point the client at another API host (a proxy or a local mock).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.api_base, path))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
    }

    async fn send(&self, request: reqwest::RequestBuilder, operation: &str) -> Result<Value, MigrationError> {
        let failed = |detail: String| MigrationError::TargetStore {
            operation: operation.to_string(),
            detail,
        };
        let response = request.send().await.map_err(|e| failed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(failed(format!("HTTP {}: {}", status, body)));
        }
        response.json::<Value>().await.map_err(|e| failed(e.to_string()))
    }

    async fn append_json(&self, parent: &BlockHandle, block: Value) -> Result<BlockHandle, MigrationError> {
        let request = self
            .request(Method::PATCH, &format!("/v1/blocks/{}/children", parent))
            .json(&json!({ "children": [block] }));
        let response = self.send(request, "append block").await?;
        response["results"][0]["id"]
            .as_str()
            .map(BlockHandle::new)
            .ok_or_else(|| MigrationError::TargetStore {
                operation: "append block".to_string(),
                detail: "response carries no block id".to_string(),
            })
    }

    async fn upload(&self, resource: &LocalResource) -> Result<String, MigrationError> {
        let name = resource.file_name().to_string();
        let create = self.request(Method::POST, "/v1/file_uploads").json(&json!({
            "filename": name,
            "content_type": resource.mimetype(),
        }));
        let created = self.send(create, "create file upload").await?;
        let upload_id = created["id"]
            .as_str()
            .ok_or_else(|| MigrationError::TargetStore {
                operation: "create file upload".to_string(),
                detail: "response carries no upload id".to_string(),
            })?
            .to_string();

        let bytes = tokio::fs::read(resource.path())
            .await
            .map_err(|source| MigrationError::TempFile {
                name: name.clone(),
                source,
            })?;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(name)
            .mime_str(resource.mimetype())
            .map_err(|e| MigrationError::TargetStore {
                operation: "send file upload".to_string(),
                detail: e.to_string(),
            })?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let send = self
            .request(Method::POST, &format!("/v1/file_uploads/{}/send", upload_id))
            .multipart(form);
        self.send(send, "send file upload").await?;
        Ok(upload_id)
    }
}

#[async_trait]
impl TargetStore for NotionClient {
    async fn create_page_block(&self, parent: &BlockHandle, title: &str) -> Result<BlockHandle, MigrationError> {
        let request = self.request(Method::POST, "/v1/pages").json(&json!({
            "parent": { "page_id": parent.as_str() },
            "properties": {
                "title": { "title": rich_text(&FormattedText::plain(title)) }
            }
        }));
        let response = self.send(request, "create page").await?;
        let id = response["id"].as_str().ok_or_else(|| MigrationError::TargetStore {
            operation: "create page".to_string(),
            detail: "response carries no page id".to_string(),
        })?;
        debug!("Created page '{}' ({})", title, id);
        Ok(BlockHandle::new(id))
    }

    async fn append_block(&self, parent: &BlockHandle, block: &Block) -> Result<BlockHandle, MigrationError> {
        if block.kind == BlockKind::Page {
            return self.create_page_block(parent, &block.title.plain_text()).await;
        }
        let payload = block_json(block).ok_or_else(|| MigrationError::Internal(format!(
            "{:?} blocks are written with upload_file",
            block.kind
        )))?;
        self.append_json(parent, payload).await
    }

    async fn upload_file(
        &self,
        parent: &BlockHandle,
        kind: BlockKind,
        resource: &LocalResource,
    ) -> Result<BlockHandle, MigrationError> {
        let upload_id = self.upload(resource).await?;
        let payload = media_json(kind, &upload_id).ok_or_else(|| {
            MigrationError::Internal(format!("{:?} is not a media block kind", kind))
        })?;
        self.append_json(parent, payload).await
    }

    async fn set_status(&self, handle: &BlockHandle, status: UnitStatus) -> Result<(), MigrationError> {
        let request = self
            .request(Method::PATCH, &format!("/v1/pages/{}", handle))
            .json(&json!({ "icon": { "type": "emoji", "emoji": status.glyph() } }));
        self.send(request, "set page icon").await?;
        Ok(())
    }
}

// ── Payloads ─────────────────────────────────────────────────────────────

/// Notion rich-text objects for `text`, at most [`MAX_TEXT_LEN`] characters
/// each. Links that are not absolute URLs are dropped; their text is kept.
pub fn rich_text(text: &FormattedText) -> Vec<Value> {
    let mut out = Vec::new();
    for span in text.spans() {
        let m = &span.marks;
        let link = m
            .link
            .as_deref()
            .filter(|href| is_absolute_url(href))
            .map(|url| json!({ "url": url }));
        for chunk in chunks(&span.text, MAX_TEXT_LEN) {
            out.push(json!({
                "type": "text",
                "text": { "content": chunk, "link": link },
                "annotations": {
                    "bold": m.bold,
                    "italic": m.italic,
                    "strikethrough": m.strikethrough,
                    "underline": false,
                    "code": m.code,
                    "color": "default"
                }
            }));
        }
    }
    out
}

fn is_absolute_url(href: &str) -> bool {
    reqwest::Url::parse(href)
        .map(|u| matches!(u.scheme(), "http" | "https" | "mailto"))
        .unwrap_or(false)
}

fn chunks(text: &str, max: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(max).map(|c| c.iter().collect()).collect()
}

fn type_name(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Heading1 => "heading_1",
        BlockKind::Heading2 => "heading_2",
        BlockKind::Heading3 => "heading_3",
        BlockKind::Text => "paragraph",
        BlockKind::BulletedListItem => "bulleted_list_item",
        BlockKind::NumberedListItem => "numbered_list_item",
        BlockKind::ToDo => "to_do",
        BlockKind::Quote => "quote",
        BlockKind::Callout => "callout",
        BlockKind::Code => "code",
        BlockKind::Divider => "divider",
        BlockKind::TableOfContents => "table_of_contents",
        BlockKind::Toggle => "toggle",
        BlockKind::Image => "image",
        BlockKind::File => "file",
        BlockKind::Audio => "audio",
        BlockKind::Video => "video",
        BlockKind::Pdf => "pdf",
        BlockKind::Page => "child_page",
    }
}

/// Block object for a non-media, non-page block. Children are not
/// included.
pub fn block_json(block: &Block) -> Option<Value> {
    if block.kind.is_media() || block.kind == BlockKind::Page {
        return None;
    }
    let name = type_name(block.kind);
    let body = match block.kind {
        BlockKind::Divider | BlockKind::TableOfContents => json!({}),
        BlockKind::ToDo => json!({ "rich_text": rich_text(&block.title), "checked": false }),
        BlockKind::Callout => json!({
            "rich_text": rich_text(&block.title),
            "icon": { "type": "emoji", "emoji": "💡" }
        }),
        BlockKind::Code => json!({
            "rich_text": rich_text(&block.title),
            "language": block.language.as_deref().unwrap_or("plain text")
        }),
        _ => json!({ "rich_text": rich_text(&block.title) }),
    };
    Some(json!({ "object": "block", "type": name, name: body }))
}

/// Block object for a media block carrying a completed file upload.
pub fn media_json(kind: BlockKind, upload_id: &str) -> Option<Value> {
    if !kind.is_media() {
        return None;
    }
    let name = type_name(kind);
    Some(json!({
        "object": "block",
        "type": name,
        name: { "type": "file_upload", "file_upload": { "id": upload_id } }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Marks;

    #[test]
    fn test_parse_page_id_forms() {
        let id = "0123456789abcdef0123456789abcdef";
        assert_eq!(parse_page_id(id).unwrap(), id);
        assert_eq!(
            parse_page_id("01234567-89ab-cdef-0123-456789abcdef").unwrap(),
            id
        );
        assert_eq!(
            parse_page_id("https://www.notion.so/acme/Docs-0123456789ABCDEF0123456789abcdef?pvs=4").unwrap(),
            id
        );
        assert!(parse_page_id("https://www.notion.so/acme/Docs").is_err());
    }

    #[test]
    fn test_rich_text_marks_and_links() {
        let mut text = FormattedText::new();
        text.push("plain ", &Marks::default());
        text.push(
            "bold link",
            &Marks {
                bold: true,
                link: Some("https://example.com".into()),
                ..Marks::default()
            },
        );
        text.push(
            " local",
            &Marks {
                link: Some("/wiki/spaces/X".into()),
                ..Marks::default()
            },
        );
        let rt = rich_text(&text);
        assert_eq!(rt.len(), 3);
        assert_eq!(rt[1]["annotations"]["bold"], true);
        assert_eq!(rt[1]["text"]["link"]["url"], "https://example.com");
        assert!(rt[2]["text"]["link"].is_null());
        assert_eq!(rt[2]["text"]["content"], " local");
    }

    #[test]
    fn test_rich_text_is_chunked() {
        let long = "é".repeat(4500);
        let rt = rich_text(&FormattedText::plain(long));
        let lens: Vec<usize> = rt
            .iter()
            .map(|o| o["text"]["content"].as_str().unwrap().chars().count())
            .collect();
        assert_eq!(lens, vec![2000, 2000, 500]);
    }

    #[test]
    fn test_block_payloads() {
        let todo = block_json(&Block::new(BlockKind::ToDo, "task")).unwrap();
        assert_eq!(todo["type"], "to_do");
        assert_eq!(todo["to_do"]["checked"], false);

        let callout = block_json(&Block::new(BlockKind::Callout, "note")).unwrap();
        assert_eq!(callout["callout"]["icon"]["emoji"], "💡");

        let code = block_json(&Block::code("x = 1", "python")).unwrap();
        assert_eq!(code["code"]["language"], "python");
        assert_eq!(code["code"]["rich_text"][0]["text"]["content"], "x = 1");

        let divider = block_json(&Block::empty(BlockKind::Divider)).unwrap();
        assert_eq!(divider["type"], "divider");

        assert!(block_json(&Block::media(BlockKind::Image, "/x.png")).is_none());
    }

    #[test]
    fn test_media_payload_references_upload() {
        let v = media_json(BlockKind::Pdf, "up-1").unwrap();
        assert_eq!(v["type"], "pdf");
        assert_eq!(v["pdf"]["type"], "file_upload");
        assert_eq!(v["pdf"]["file_upload"]["id"], "up-1");
        assert!(media_json(BlockKind::Text, "up-1").is_none());
    }
}
