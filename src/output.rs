//! Result types returned by [`crate::migrate::migrate`].

use crate::error::{MigrationError, UnitError};
use serde::{Deserialize, Serialize};

/// Visual outcome of a top-level unit, shown as the icon of its container
/// page in Notion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitStatus {
    Succeeded,
    Failed,
}

impl UnitStatus {
    /// Emoji used as the page icon.
    pub fn glyph(self) -> &'static str {
        match self {
            UnitStatus::Succeeded => "✅",
            UnitStatus::Failed => "❌",
        }
    }
}

/// Counters for one space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Pages converted (the homepage and every descendant).
    pub pages: usize,
    /// Blocks created in the target, page blocks included.
    pub blocks: usize,
    /// Files uploaded (attachment links and embedded images).
    pub attachments: usize,
    /// Attachment links with no entry in their page's attachment index.
    pub missing_attachments: usize,
    /// Embedded constructs skipped for lack of a handler.
    pub unsupported_constructs: usize,
    /// Tables emitted as text because they could not be laid out.
    pub table_fallbacks: usize,
}

impl UnitStats {
    pub fn merge(&mut self, other: &UnitStats) {
        self.pages += other.pages;
        self.blocks += other.blocks;
        self.attachments += other.attachments;
        self.missing_attachments += other.missing_attachments;
        self.unsupported_constructs += other.unsupported_constructs;
        self.table_fallbacks += other.table_fallbacks;
    }
}

/// Outcome of one space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitResult {
    /// Space display name.
    pub name: String,
    /// Space key.
    pub key: String,
    pub status: UnitStatus,
    /// Counters up to the point of failure, if any.
    pub stats: UnitStats,
    pub error: Option<UnitError>,
    pub duration_ms: u64,
}

impl UnitResult {
    pub fn is_success(&self) -> bool {
        self.status == UnitStatus::Succeeded
    }
}

/// Aggregate counters for a whole run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationStats {
    pub total_units: usize,
    pub succeeded_units: usize,
    pub failed_units: usize,
    /// Sum of every unit's counters.
    pub totals: UnitStats,
    pub total_duration_ms: u64,
}

/// Everything a migration run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationOutput {
    /// One result per space, in completion order.
    pub units: Vec<UnitResult>,
    pub stats: MigrationStats,
}

impl MigrationOutput {
    pub(crate) fn from_units(units: Vec<UnitResult>, total_duration_ms: u64) -> Self {
        let mut totals = UnitStats::default();
        for unit in &units {
            totals.merge(&unit.stats);
        }
        let succeeded_units = units.iter().filter(|u| u.is_success()).count();
        let stats = MigrationStats {
            total_units: units.len(),
            succeeded_units,
            failed_units: units.len() - succeeded_units,
            totals,
            total_duration_ms,
        };
        Self { units, stats }
    }

    /// Treat any failed space as an error.
    pub fn into_result(self) -> Result<Self, MigrationError> {
        if self.stats.failed_units > 0 {
            Err(MigrationError::PartialFailure {
                succeeded: self.stats.succeeded_units,
                failed: self.stats.failed_units,
                total: self.stats.total_units,
            })
        } else {
            Ok(self)
        }
    }
}
