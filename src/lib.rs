//! # confluence2notion
//!
//! Migrate Confluence spaces into Notion: every page, every child page and
//! every attachment, rebuilt as native Notion blocks.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Confluence space
//!  │
//!  ├─ 1. List     spaces (paginated), filtered by MigrationConfig::spaces
//!  ├─ 2. Walk     homepage, then child pages, depth-first pre-order
//!  ├─ 3. Index    the page's attachment listing (in-document link → download)
//!  ├─ 4. Convert  exported HTML → typed blocks (headings, lists, code, tables, …)
//!  ├─ 5. Persist  blocks in document order; attachments are downloaded to a
//!  │              temp file, uploaded, and the temp file dropped
//!  └─ 6. Mark     the space's container page ✅ or ❌
//! ```
//!
//! Spaces run concurrently (`MigrationConfig::concurrency`); inside a space
//! everything is sequential. A failing space never stops its siblings.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use confluence2notion::{
//!     migrate, parse_page_id, BlockHandle, ConfluenceClient, Credentials, MigrationConfig,
//!     NotionClient,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MigrationConfig::default();
//!     let source = ConfluenceClient::new(
//!         "https://acme.atlassian.net/wiki",
//!         Credentials::new("me@acme.com", std::env::var("CONFLUENCE_API_TOKEN")?),
//!         &config,
//!     )?;
//!     let target = NotionClient::new(std::env::var("NOTION_TOKEN")?, &config)?;
//!     let root = BlockHandle::new(parse_page_id("https://www.notion.so/acme/Wiki-0123456789abcdef0123456789abcdef")?);
//!
//!     let output = migrate(Arc::new(source), Arc::new(target), &root, &config).await?;
//!     eprintln!("{}/{} spaces, {} pages",
//!         output.stats.succeeded_units,
//!         output.stats.total_units,
//!         output.stats.totals.pages);
//!     Ok(())
//! }
//! ```
//!
//! Only the page body converter is needed to turn HTML into blocks offline:
//!
//! ```rust
//! use confluence2notion::{convert_body, AttachmentIndex, BlankLines, BlockKind};
//!
//! let out = convert_body("<h1>Title</h1><hr>", &AttachmentIndex::default(), BlankLines::Preserve);
//! assert_eq!(out.blocks[0].kind, BlockKind::Heading1);
//! assert_eq!(out.blocks[1].kind, BlockKind::Divider);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `confluence2notion` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! confluence2notion = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod block;
pub mod config;
pub mod confluence;
pub mod error;
pub mod migrate;
pub mod notion;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod source;
pub mod stream;
pub mod target;
pub mod text;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use block::{Block, BlockKind};
pub use config::{BlankLines, MigrationConfig, MigrationConfigBuilder, SpaceSelection};
pub use confluence::{ConfluenceClient, Credentials};
pub use error::{Diagnostic, MigrationError, UnitError};
pub use migrate::{migrate, migrate_space};
pub use notion::{parse_page_id, NotionClient};
pub use output::{MigrationOutput, MigrationStats, UnitResult, UnitStats, UnitStatus};
pub use pipeline::attachments::AttachmentIndex;
pub use pipeline::dispatch::{convert_body, Conversion};
pub use pipeline::fetch::LocalResource;
pub use progress::{MigrationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use source::{Attachment, Collection, PageContent, SourceStore};
pub use stream::{migrate_stream, UnitStream};
pub use target::{BlockHandle, TargetStore};
pub use text::{FormattedText, Marks, Span};
