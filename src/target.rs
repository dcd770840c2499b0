//! Target block store: the write side of a migration.
//!
//! Blocks are written one at a time, in document order, and every write
//! returns the handle of the new block so nested content can go under it.

use crate::block::{Block, BlockKind};
use crate::error::MigrationError;
use crate::output::UnitStatus;
use crate::pipeline::fetch::LocalResource;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a block in the target store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockHandle(pub String);

impl BlockHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Write access to the target block tree.
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Create a page container titled `title` under `parent`.
    async fn create_page_block(&self, parent: &BlockHandle, title: &str) -> Result<BlockHandle, MigrationError>;

    /// Append a non-media block under `parent`. Its children are not written;
    /// callers append them under the returned handle.
    async fn append_block(&self, parent: &BlockHandle, block: &Block) -> Result<BlockHandle, MigrationError>;

    /// Upload `resource` and append a media block of `kind` carrying it.
    async fn upload_file(
        &self,
        parent: &BlockHandle,
        kind: BlockKind,
        resource: &LocalResource,
    ) -> Result<BlockHandle, MigrationError>;

    /// Mark a top-level container with the outcome of its unit.
    async fn set_status(&self, handle: &BlockHandle, status: UnitStatus) -> Result<(), MigrationError>;
}
