//! Source document store: the read side of a migration.
//!
//! [`crate::confluence::ConfluenceClient`] is the HTTP implementation; tests
//! use in-memory stores. Listings are streams so paginated endpoints are
//! consumed lazily, one page of results at a time.

use crate::error::MigrationError;
use crate::pipeline::fetch::LocalResource;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// A top-level unit of migration (a Confluence space).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub key: String,
    pub name: String,
    /// Reference passed to [`SourceStore::get_page`] for the space homepage.
    pub homepage_ref: String,
}

/// One page as returned by the source store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    pub id: String,
    pub title: String,
    /// Exported HTML of the page body.
    pub body_html: String,
    /// Base reference for the page's child listings.
    pub children_ref: String,
}

/// One entry of a page's attachment listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub title: String,
    /// The attachment's in-document link, as used in page bodies.
    pub web_link_key: String,
    /// Where the file can be downloaded from.
    pub download_locator: String,
}

/// Read access to the source document tree.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Every top-level collection, across all result pages.
    fn list_collections(&self) -> BoxStream<'_, Result<Collection, MigrationError>>;

    /// Fetch one page with its body.
    async fn get_page(&self, page_ref: &str) -> Result<PageContent, MigrationError>;

    /// The direct child pages of `page`, across all result pages.
    fn list_children<'a>(
        &'a self,
        page: &'a PageContent,
    ) -> BoxStream<'a, Result<PageContent, MigrationError>>;

    /// Attachments of `page`.
    async fn list_attachments(&self, page: &PageContent) -> Result<Vec<Attachment>, MigrationError>;

    /// Download `locator` into a temporary local file.
    async fn fetch_resource(&self, locator: &str) -> Result<LocalResource, MigrationError>;
}
