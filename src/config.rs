//! Configuration types for a Confluence → Notion migration.
//!
//! All migration behaviour is controlled through [`MigrationConfig`], built
//! via its [`MigrationConfigBuilder`]. Credentials are not part of the config;
//! they are handed to [`crate::confluence::ConfluenceClient`] and
//! [`crate::notion::NotionClient`] directly.

use crate::error::MigrationError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a migration run.
///
/// # Example
/// ```rust
/// use confluence2notion::{BlankLines, MigrationConfig, SpaceSelection};
///
/// let config = MigrationConfig::builder()
///     .concurrency(8)
///     .blank_lines(BlankLines::Drop)
///     .spaces(SpaceSelection::Keys(vec!["ENG".into()]))
///     .build()
///     .unwrap();
/// assert_eq!(config.concurrency, 8);
/// ```
#[derive(Clone)]
pub struct MigrationConfig {
    /// Number of spaces migrated at the same time. Default: 4.
    ///
    /// Each space is converted strictly sequentially; this only bounds how
    /// many spaces are in flight.
    pub concurrency: usize,

    /// What to do with blank lines inside converted text. Default: [`BlankLines::Preserve`].
    pub blank_lines: BlankLines,

    /// Path prefix stripped from attachment links before the index lookup.
    /// Default: `/wiki` (Confluence Cloud serves everything below it).
    pub link_prefix: String,

    /// Which spaces to migrate. Default: all of them.
    pub spaces: SpaceSelection,

    /// Timeout for Confluence and Notion API calls in seconds. Default: 60.
    pub request_timeout_secs: u64,

    /// Timeout for a single attachment download in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional per-space progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            blank_lines: BlankLines::default(),
            link_prefix: "/wiki".to_string(),
            spaces: SpaceSelection::default(),
            request_timeout_secs: 60,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for MigrationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationConfig")
            .field("concurrency", &self.concurrency)
            .field("blank_lines", &self.blank_lines)
            .field("link_prefix", &self.link_prefix)
            .field("spaces", &self.spaces)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn MigrationProgressCallback>"),
            )
            .finish()
    }
}

impl MigrationConfig {
    /// Create a new builder for `MigrationConfig`.
    pub fn builder() -> MigrationConfigBuilder {
        MigrationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`MigrationConfig`].
pub struct MigrationConfigBuilder {
    config: MigrationConfig,
}

impl MigrationConfigBuilder {
    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn blank_lines(mut self, policy: BlankLines) -> Self {
        self.config.blank_lines = policy;
        self
    }

    pub fn link_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.link_prefix = prefix.into();
        self
    }

    pub fn spaces(mut self, selection: SpaceSelection) -> Self {
        self.config.spaces = selection;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<MigrationConfig, MigrationError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(MigrationError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if !c.link_prefix.is_empty() && !c.link_prefix.starts_with('/') {
            return Err(MigrationError::InvalidConfig(format!(
                "Link prefix must start with '/', got '{}'",
                c.link_prefix
            )));
        }
        if c.request_timeout_secs == 0 || c.download_timeout_secs == 0 {
            return Err(MigrationError::InvalidConfig(
                "Timeouts must be at least one second".into(),
            ));
        }
        if let SpaceSelection::Keys(ref keys) = c.spaces {
            if keys.is_empty() {
                return Err(MigrationError::InvalidConfig(
                    "Space selection must name at least one space key".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Policy for blank lines produced by splitting converted text on line
/// breaks.
///
/// Blank lines at the start or end of a converted node never produce a
/// block, whatever the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlankLines {
    /// Each run of interior blank lines becomes one empty text block,
    /// keeping the paragraph spacing of the source. (default)
    #[default]
    Preserve,
    /// Blank lines never produce a block.
    Drop,
}

/// Which Confluence spaces to migrate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpaceSelection {
    /// Every space the credentials can see (default).
    #[default]
    All,
    /// Only spaces whose key is listed (case-insensitive).
    Keys(Vec<String>),
}

impl SpaceSelection {
    pub fn includes(&self, key: &str) -> bool {
        match self {
            SpaceSelection::All => true,
            SpaceSelection::Keys(keys) => keys.iter().any(|k| k.eq_ignore_ascii_case(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = MigrationConfig::default();
        assert_eq!(c.concurrency, 4);
        assert_eq!(c.blank_lines, BlankLines::Preserve);
        assert_eq!(c.link_prefix, "/wiki");
        assert_eq!(c.spaces, SpaceSelection::All);
    }

    #[test]
    fn builder_clamps_concurrency() {
        let c = MigrationConfig::builder().concurrency(0).build().unwrap();
        assert_eq!(c.concurrency, 1);
    }

    #[test]
    fn builder_rejects_relative_prefix() {
        let err = MigrationConfig::builder()
            .link_prefix("wiki")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Link prefix"));
    }

    #[test]
    fn builder_accepts_empty_prefix() {
        assert!(MigrationConfig::builder().link_prefix("").build().is_ok());
    }

    #[test]
    fn builder_rejects_empty_key_list() {
        assert!(MigrationConfig::builder()
            .spaces(SpaceSelection::Keys(vec![]))
            .build()
            .is_err());
    }

    #[test]
    fn space_selection_is_case_insensitive() {
        let sel = SpaceSelection::Keys(vec!["eng".into(), "OPS".into()]);
        assert!(sel.includes("ENG"));
        assert!(sel.includes("ops"));
        assert!(!sel.includes("HR"));
        assert!(SpaceSelection::All.includes("anything"));
    }
}
