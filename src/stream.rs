//! Streaming migration API: emit each space's result as it completes.
//!
//! Unlike the eager [`crate::migrate::migrate`], which returns only after
//! every space has been attempted, [`migrate_stream`] yields [`UnitResult`]
//! items as soon as each space finishes. Spaces run concurrently, so results
//! arrive in completion order, not listing order.

use crate::config::MigrationConfig;
use crate::error::MigrationError;
use crate::migrate::{select_collections, spawn_unit};
use crate::output::UnitResult;
use crate::source::SourceStore;
use crate::target::{BlockHandle, TargetStore};
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-space results.
pub type UnitStream = Pin<Box<dyn Stream<Item = UnitResult> + Send>>;

/// Migrate every selected space, streaming results as spaces finish.
///
/// # Returns
/// - `Ok(UnitStream)` — one [`UnitResult`] per selected space
/// - `Err(MigrationError)` — listing the spaces failed or none matched
///
/// # Example
/// ```rust,no_run
/// use confluence2notion::{migrate_stream, BlockHandle, ConfluenceClient, Credentials, MigrationConfig, NotionClient};
/// use futures::StreamExt;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = MigrationConfig::default();
/// let source = ConfluenceClient::new(
///     "https://acme.atlassian.net/wiki",
///     Credentials::new("me@acme.com", "api-token"),
///     &config,
/// )?;
/// let target = NotionClient::new("secret_token", &config)?;
/// let root = BlockHandle::new("0123456789abcdef0123456789abcdef");
///
/// let mut results = migrate_stream(Arc::new(source), Arc::new(target), &root, &config).await?;
/// while let Some(unit) = results.next().await {
///     println!("{} {}: {} pages", unit.status.glyph(), unit.name, unit.stats.pages);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn migrate_stream(
    source: Arc<dyn SourceStore>,
    target: Arc<dyn TargetStore>,
    root: &BlockHandle,
    config: &MigrationConfig,
) -> Result<UnitStream, MigrationError> {
    info!("Starting streaming migration into {}", root);

    let collections = select_collections(source.as_ref(), &config.spaces).await?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_migration_start(collections.len());
    }

    let root = root.clone();
    let config_clone = config.clone();
    let s = stream::iter(collections.into_iter().map(move |collection| {
        spawn_unit(
            Arc::clone(&source),
            Arc::clone(&target),
            root.clone(),
            collection,
            config_clone.clone(),
        )
    }))
    .buffer_unordered(config.concurrency);

    Ok(Box::pin(s))
}
