//! Error types for the confluence2notion library.
//!
//! Three layers, from most to least severe:
//!
//! * [`MigrationError`] — **Propagating**: something a caller must see. A
//!   failed attachment download, an unreachable page, a rejected Notion
//!   request. Inside a space it aborts that space's remaining recursion; at
//!   the top level (listing spaces, bad config) it aborts the run.
//!
//! * [`UnitError`] — **Per space**: the reason one top-level unit failed,
//!   stored in [`crate::output::UnitResult`] so the other spaces keep going.
//!
//! * [`Diagnostic`] — **Recovered**: a missing attachment, an unsupported
//!   macro, a malformed table. Logged as a `warn!` event and counted; the
//!   converter carries on without the affected block.

use thiserror::Error;

/// All propagating errors returned by the confluence2notion library.
#[derive(Debug, Error)]
pub enum MigrationError {
    // ── Source store ──────────────────────────────────────────────────────
    /// Downloading a resource failed (network error or non-2xx status).
    #[error("Failed to fetch '{url}': {reason}")]
    Transport { url: String, reason: String },

    /// Downloading a resource exceeded the configured timeout.
    #[error("Fetching '{url}' timed out after {secs}s\nIncrease --download-timeout.")]
    TransportTimeout { url: String, secs: u64 },

    /// Confluence reported a non-success status for a page.
    #[error("Page lookup failed for '{page_ref}': {detail}")]
    PageLookup { page_ref: String, detail: String },

    /// A Confluence listing endpoint failed.
    #[error("Confluence API request to '{url}' failed: {reason}")]
    SourceApi { url: String, reason: String },

    /// A response body could not be decoded.
    #[error("Unexpected response from '{url}': {reason}")]
    Decode { url: String, reason: String },

    // ── Target store ──────────────────────────────────────────────────────
    /// Notion rejected a request.
    #[error("Notion {operation} failed: {detail}")]
    TargetStore { operation: String, detail: String },

    // ── Local resources ───────────────────────────────────────────────────
    /// A temporary file for an attachment could not be created or written.
    #[error("Temporary file error for '{name}': {source}")]
    TempFile {
        name: String,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Run outcome ───────────────────────────────────────────────────────
    /// The source store listed no spaces matching the selection.
    #[error("No Confluence spaces matched the selection")]
    NoCollections,

    /// Every space failed.
    #[error("All {total} spaces failed.\nFirst error: {first_error}")]
    AllUnitsFailed { total: usize, first_error: String },

    /// Some spaces succeeded but at least one failed.
    ///
    /// Returned by [`crate::output::MigrationOutput::into_result`] when
    /// the caller wants to treat any unit failure as an error.
    #[error("{failed}/{total} spaces failed during migration")]
    PartialFailure {
        succeeded: usize,
        failed: usize,
        total: usize,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a single top-level unit (space) failed.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum UnitError {
    /// Conversion stopped on a propagating error.
    #[error("Space '{unit}' failed: {detail}")]
    Failed { unit: String, detail: String },

    /// Conversion panicked; the panic was contained at the unit boundary.
    #[error("Space '{unit}' panicked: {detail}")]
    Panicked { unit: String, detail: String },
}

/// A recovered, node-level problem found while converting a page body.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Diagnostic {
    /// An attachment link had no entry in the page's attachment index.
    LookupMiss { href: String },
    /// An embedded construct with no handler.
    UnsupportedConstruct { classes: Vec<String> },
    /// A table that could not be laid out as a grid; emitted as text.
    MalformedStructure { detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_display() {
        let e = MigrationError::PartialFailure {
            succeeded: 3,
            failed: 1,
            total: 4,
        };
        assert!(e.to_string().contains("1/4"), "got: {e}");
    }

    #[test]
    fn transport_display_names_url() {
        let e = MigrationError::Transport {
            url: "https://wiki.example.com/download/a.png".into(),
            reason: "HTTP 404 Not Found".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("a.png"));
        assert!(msg.contains("404"));
    }

    #[test]
    fn unit_error_display() {
        let e = UnitError::Panicked {
            unit: "Engineering".into(),
            detail: "boom".into(),
        };
        assert!(e.to_string().contains("Engineering"));
        assert!(e.to_string().contains("boom"));
    }
}
