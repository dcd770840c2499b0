//! Eager migration entry points.
//!
//! [`migrate`] lists the spaces, migrates up to `config.concurrency` of them
//! at once, and returns after every space has been attempted. Use
//! [`crate::stream::migrate_stream`] to receive each [`UnitResult`] as soon
//! as its space finishes.
//!
//! Every space runs on its own tokio task. An error or a panic while
//! converting one space marks that space's container ❌ and is reported in
//! its [`UnitResult`]; the other spaces are unaffected.

use crate::config::{MigrationConfig, SpaceSelection};
use crate::error::{MigrationError, UnitError};
use crate::output::{MigrationOutput, UnitResult, UnitStats, UnitStatus};
use crate::pipeline::walker::PageWalker;
use crate::source::{Collection, SourceStore};
use crate::target::{BlockHandle, TargetStore};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Migrate every selected space of `source` into `target`, one container
/// page per space under `root`.
///
/// # Returns
/// `Ok(MigrationOutput)` when at least one space succeeded, even if others
/// failed (check `output.stats.failed_units` or call
/// [`MigrationOutput::into_result`]).
///
/// # Errors
/// - listing the spaces failed
/// - no space matched [`MigrationConfig::spaces`]
/// - every space failed ([`MigrationError::AllUnitsFailed`])
pub async fn migrate(
    source: Arc<dyn SourceStore>,
    target: Arc<dyn TargetStore>,
    root: &BlockHandle,
    config: &MigrationConfig,
) -> Result<MigrationOutput, MigrationError> {
    let total_start = Instant::now();
    info!("Starting migration into {}", root);

    let collections = select_collections(source.as_ref(), &config.spaces).await?;
    let total = collections.len();
    info!("Migrating {} spaces (concurrency {})", total, config.concurrency);

    if let Some(ref cb) = config.progress_callback {
        cb.on_migration_start(total);
    }

    let units: Vec<UnitResult> = stream::iter(collections.into_iter().map(|collection| {
        spawn_unit(
            Arc::clone(&source),
            Arc::clone(&target),
            root.clone(),
            collection,
            config.clone(),
        )
    }))
    .buffer_unordered(config.concurrency)
    .collect()
    .await;

    let output = MigrationOutput::from_units(units, total_start.elapsed().as_millis() as u64);

    if let Some(ref cb) = config.progress_callback {
        cb.on_migration_complete(total, output.stats.succeeded_units);
    }

    if output.stats.succeeded_units == 0 {
        let first_error = output
            .units
            .iter()
            .find_map(|u| u.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(MigrationError::AllUnitsFailed { total, first_error });
    }

    info!(
        "Migration complete: {}/{} spaces, {} pages, {}ms total",
        output.stats.succeeded_units,
        total,
        output.stats.totals.pages,
        output.stats.total_duration_ms
    );

    Ok(output)
}

/// Migrate one space: create its container under `root`, write the
/// homepage tree under it and mark the container with the outcome.
///
/// Never fails: errors and panics are reported in the returned
/// [`UnitResult`].
pub async fn migrate_space(
    source: Arc<dyn SourceStore>,
    target: Arc<dyn TargetStore>,
    root: BlockHandle,
    collection: Collection,
    config: MigrationConfig,
) -> UnitResult {
    let start = Instant::now();
    let name = collection.name.clone();
    info!("Space '{}' ({}): starting", name, collection.key);
    if let Some(ref cb) = config.progress_callback {
        cb.on_unit_start(&name);
    }

    let container = match target.create_page_block(&root, &name).await {
        Ok(handle) => handle,
        Err(e) => {
            let error = UnitError::Failed {
                unit: name.clone(),
                detail: e.to_string(),
            };
            return finish(&collection, &config, UnitStats::default(), Some(error), start);
        }
    };

    let mut walker = PageWalker::new(source.as_ref(), target.as_ref(), &config);
    let outcome = AssertUnwindSafe(async {
        let homepage = source.get_page(&collection.homepage_ref).await?;
        walker.write_page(&container, &homepage).await
    })
    .catch_unwind()
    .await;

    let error = match outcome {
        Ok(Ok(_)) => None,
        Ok(Err(e)) => Some(UnitError::Failed {
            unit: name.clone(),
            detail: e.to_string(),
        }),
        Err(payload) => Some(UnitError::Panicked {
            unit: name.clone(),
            detail: panic_message(payload.as_ref()),
        }),
    };
    let mut stats = walker.into_stats();
    stats.blocks += 1;

    let status = if error.is_none() {
        UnitStatus::Succeeded
    } else {
        UnitStatus::Failed
    };
    if let Err(e) = target.set_status(&container, status).await {
        warn!("Space '{}': could not set status {}: {}", name, status.glyph(), e);
    }

    finish(&collection, &config, stats, error, start)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// List every space and keep the selected ones, in listing order.
pub(crate) async fn select_collections(
    source: &dyn SourceStore,
    selection: &SpaceSelection,
) -> Result<Vec<Collection>, MigrationError> {
    let mut listing = source.list_collections();
    let mut selected = Vec::new();
    while let Some(collection) = listing.next().await {
        let collection = collection?;
        if selection.includes(&collection.key) {
            selected.push(collection);
        } else {
            info!("Skipping space '{}' ({})", collection.name, collection.key);
        }
    }
    if selected.is_empty() {
        return Err(MigrationError::NoCollections);
    }
    Ok(selected)
}

/// Run [`migrate_space`] on its own task. A panic that escapes the unit's
/// own guard still becomes a failed [`UnitResult`].
pub(crate) fn spawn_unit(
    source: Arc<dyn SourceStore>,
    target: Arc<dyn TargetStore>,
    root: BlockHandle,
    collection: Collection,
    config: MigrationConfig,
) -> impl Future<Output = UnitResult> + Send {
    let name = collection.name.clone();
    let key = collection.key.clone();
    let task = tokio::spawn(migrate_space(source, target, root, collection, config));
    async move {
        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!("Space '{}': task aborted: {}", name, e);
                UnitResult {
                    error: Some(UnitError::Panicked {
                        unit: name.clone(),
                        detail: e.to_string(),
                    }),
                    name,
                    key,
                    status: UnitStatus::Failed,
                    stats: UnitStats::default(),
                    duration_ms: 0,
                }
            }
        }
    }
}

fn finish(
    collection: &Collection,
    config: &MigrationConfig,
    stats: UnitStats,
    error: Option<UnitError>,
    start: Instant,
) -> UnitResult {
    let duration_ms = start.elapsed().as_millis() as u64;
    match &error {
        None => {
            info!(
                "Space '{}': done, {} pages, {} blocks in {}ms",
                collection.name, stats.pages, stats.blocks, duration_ms
            );
            if let Some(ref cb) = config.progress_callback {
                cb.on_unit_complete(&collection.name, &stats);
            }
        }
        Some(e) => {
            error!("{}", e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_unit_error(&collection.name, &e.to_string());
            }
        }
    }
    UnitResult {
        name: collection.name.clone(),
        key: collection.key.clone(),
        status: if error.is_none() {
            UnitStatus::Succeeded
        } else {
            UnitStatus::Failed
        },
        stats,
        error,
        duration_ms,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_variants() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
    }
}
