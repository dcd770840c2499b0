//! Conversion stages for one Confluence page.
//!
//! ## Data Flow
//!
//! ```text
//! walker ──▶ attachments ──▶ dispatch ──▶ {inline, table} ──▶ walker
//! (page)     (link index)    (NodeKind)    (text, grids)      (persist, fetch)
//! ```
//!
//! 1. [`markup`]      — parse the exported HTML into an owned node tree
//! 2. [`attachments`] — index the page's attachments by in-document link
//! 3. [`dispatch`]    — classify each node and build the block tree
//! 4. [`inline`]      — render a node's inner markup as formatted text
//! 5. [`table`]       — lay a table out as a fixed-width text grid
//! 6. [`fetch`]       — download an attachment into a scoped temp file
//! 7. [`walker`]      — persist blocks in order and recurse into child
//!    pages; the only stage with network I/O

pub mod attachments;
pub mod dispatch;
pub mod fetch;
pub mod inline;
pub mod markup;
pub mod table;
pub mod walker;
