//! Progress-callback trait for per-space migration events.
//!
//! Inject an [`Arc<dyn MigrationProgressCallback>`] via
//! [`crate::config::MigrationConfigBuilder::progress_callback`] to receive
//! events as each space starts, finishes or fails.
//!
//! # Example
//!
//! ```rust
//! use confluence2notion::{MigrationConfig, MigrationProgressCallback, UnitStats};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl MigrationProgressCallback for CountingCallback {
//!     fn on_unit_complete(&self, name: &str, stats: &UnitStats) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{done}: {name} ({} pages)", stats.pages);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = MigrationConfig::builder()
//!     .progress_callback(counter as Arc<dyn MigrationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::UnitStats;
use std::sync::Arc;

/// Called by the migration as it processes each space.
///
/// Spaces run concurrently, so every method may be called from several
/// tasks at once. All methods default to no-ops.
pub trait MigrationProgressCallback: Send + Sync {
    /// Called once, after the space listing is known.
    fn on_migration_start(&self, total_units: usize) {
        let _ = total_units;
    }

    /// Called when a space's conversion begins.
    fn on_unit_start(&self, name: &str) {
        let _ = name;
    }

    /// Called when a space has been fully converted.
    fn on_unit_complete(&self, name: &str, stats: &UnitStats) {
        let _ = (name, stats);
    }

    /// Called when a space failed; `error` is human-readable.
    fn on_unit_error(&self, name: &str, error: &str) {
        let _ = (name, error);
    }

    /// Called once after every space has been attempted.
    fn on_migration_complete(&self, total_units: usize, succeeded: usize) {
        let _ = (total_units, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl MigrationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::MigrationConfig`].
pub type ProgressCallback = Arc<dyn MigrationProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        pages: AtomicUsize,
    }

    impl MigrationProgressCallback for TrackingCallback {
        fn on_unit_start(&self, _name: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_unit_complete(&self, _name: &str, stats: &UnitStats) {
            self.completes.fetch_add(1, Ordering::SeqCst);
            self.pages.fetch_add(stats.pages, Ordering::SeqCst);
        }

        fn on_unit_error(&self, _name: &str, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_migration_start(2);
        cb.on_unit_start("ENG");
        cb.on_unit_complete("ENG", &UnitStats::default());
        cb.on_unit_error("OPS", "boom");
        cb.on_migration_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        let stats = UnitStats {
            pages: 3,
            ..UnitStats::default()
        };

        tracker.on_unit_start("ENG");
        tracker.on_unit_complete("ENG", &stats);
        tracker.on_unit_start("OPS");
        tracker.on_unit_error("OPS", "HTTP 500");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.pages.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_migration_start(10);
        cb.on_unit_start("ENG");
    }
}
