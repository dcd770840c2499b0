//! Page walker: write one page tree into the target store.
//!
//! For every page, in depth-first pre-order:
//!
//! 1. create the page block under its parent
//! 2. index the page's attachments
//! 3. convert the body and persist the blocks in document order; a media
//!    block is fetched into a temporary file, uploaded, and the file is
//!    dropped before the next block is written
//! 4. walk the child pages, each under this page's block
//!
//! A page's body is therefore fully persisted before any of its children is
//! created. The first propagating error aborts the rest of the walk.

use crate::block::Block;
use crate::config::MigrationConfig;
use crate::error::{Diagnostic, MigrationError};
use crate::output::UnitStats;
use crate::pipeline::attachments::AttachmentIndex;
use crate::pipeline::dispatch::convert_body;
use crate::source::{PageContent, SourceStore};
use crate::target::{BlockHandle, TargetStore};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use tracing::debug;

/// Walks a page tree from a source store into a target store.
pub struct PageWalker<'a> {
    source: &'a dyn SourceStore,
    target: &'a dyn TargetStore,
    config: &'a MigrationConfig,
    stats: UnitStats,
}

impl<'a> PageWalker<'a> {
    pub fn new(source: &'a dyn SourceStore, target: &'a dyn TargetStore, config: &'a MigrationConfig) -> Self {
        Self {
            source,
            target,
            config,
            stats: UnitStats::default(),
        }
    }

    pub fn into_stats(self) -> UnitStats {
        self.stats
    }

    /// Write `page` and all its descendants under `parent`. Returns the
    /// handle of the page block.
    pub fn write_page<'s>(
        &'s mut self,
        parent: &'s BlockHandle,
        page: &'s PageContent,
    ) -> BoxFuture<'s, Result<BlockHandle, MigrationError>> {
        async move {
            debug!("Converting page '{}' ({})", page.title, page.id);
            let source = self.source;

            let handle = self.target.create_page_block(parent, &page.title).await?;
            self.stats.pages += 1;
            self.stats.blocks += 1;

            let attachments = source.list_attachments(page).await?;
            let index = AttachmentIndex::new(&attachments, self.config.link_prefix.as_str());
            if !index.is_empty() {
                debug!("Page '{}': {} attachments indexed", page.title, index.len());
            }
            let conversion = convert_body(&page.body_html, &index, self.config.blank_lines);
            drop(index);
            self.record(&conversion.diagnostics);

            for block in &conversion.blocks {
                self.persist(&handle, block).await?;
            }
            debug!(
                "Page '{}': {} blocks written, walking children",
                page.title,
                conversion
                    .blocks
                    .iter()
                    .map(|b| 1 + b.descendant_count())
                    .sum::<usize>()
            );

            let mut children = source.list_children(page);
            while let Some(child) = children.next().await {
                let child = child?;
                self.write_page(&handle, &child).await?;
            }

            Ok(handle)
        }
        .boxed()
    }

    /// Persist `block` under `parent`, then its children under it.
    fn persist<'s>(
        &'s mut self,
        parent: &'s BlockHandle,
        block: &'s Block,
    ) -> BoxFuture<'s, Result<(), MigrationError>> {
        async move {
            let handle = match block.media.as_deref() {
                Some(locator) if block.kind.is_media() => {
                    let resource = self.source.fetch_resource(locator).await?;
                    let handle = self.target.upload_file(parent, block.kind, &resource).await?;
                    debug!("Uploaded {} as {:?}", resource.file_name(), block.kind);
                    drop(resource);
                    self.stats.attachments += 1;
                    handle
                }
                _ => self.target.append_block(parent, block).await?,
            };
            self.stats.blocks += 1;

            for child in &block.children {
                self.persist(&handle, child).await?;
            }
            Ok(())
        }
        .boxed()
    }

    fn record(&mut self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            match diagnostic {
                Diagnostic::LookupMiss { .. } => self.stats.missing_attachments += 1,
                Diagnostic::UnsupportedConstruct { .. } => self.stats.unsupported_constructs += 1,
                Diagnostic::MalformedStructure { .. } => self.stats.table_fallbacks += 1,
            }
        }
    }
}
