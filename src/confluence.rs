//! Confluence Cloud REST client, the [`SourceStore`] used by the CLI.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | spaces | `GET {base}/rest/api/space` |
//! | page | `GET {base}{ref}?expand=body.export_view,children` |
//! | child pages | `GET {base}{children_ref}/page?expand=body.export_view,children` |
//! | attachments | `GET {base}{children_ref}/attachment` |
//!
//! Listings are paginated with `start`/`limit`/`size`; the next page is
//! requested until `start + limit >= size`. The attachment listing only
//! reads its first page of results.

use crate::config::MigrationConfig;
use crate::error::MigrationError;
use crate::pipeline::fetch::{self, BasicAuth, LocalResource};
use crate::source::{Attachment, Collection, PageContent, SourceStore};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

const PAGE_EXPAND: &str = "body.export_view,children";

/// Confluence account name and API token, sent as HTTP basic auth.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub api_token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_token: api_token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// HTTP client for one Confluence site.
#[derive(Debug, Clone)]
pub struct ConfluenceClient {
    base_url: String,
    credentials: Credentials,
    http: reqwest::Client,
    download_timeout_secs: u64,
}

impl ConfluenceClient {
    /// `base_url` is the site root the REST paths hang off, e.g.
    /// `https://acme.atlassian.net/wiki`.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        config: &MigrationConfig,
    ) -> Result<Self, MigrationError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if reqwest::Url::parse(&base_url).is_err() {
            return Err(MigrationError::InvalidConfig(format!(
                "Confluence URL '{}' is not an absolute URL",
                base_url
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| MigrationError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url,
            credentials,
            http,
            download_timeout_secs: config.download_timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a locator; relative locators hang off the base URL.
    /// Site-absolute locators that already carry the base path
    /// (`/wiki/download/...`) are joined to the origin instead.
    pub fn resolve(&self, locator: &str) -> String {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            return locator.to_string();
        }
        if !locator.starts_with('/') {
            return format!("{}/{}", self.base_url, locator);
        }
        if let Ok(base) = reqwest::Url::parse(&self.base_url) {
            let base_path = base.path().trim_end_matches('/');
            let carries_base_path = !base_path.is_empty()
                && locator
                    .strip_prefix(base_path)
                    .is_some_and(|rest| rest.starts_with('/'));
            if carries_base_path {
                return format!("{}{}", base.origin().ascii_serialization(), locator);
            }
        }
        format!("{}{}", self.base_url, locator)
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.api_token))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, MigrationError> {
        debug!("GET {} {:?}", url, query);
        let response = self
            .request(url)
            .query(query)
            .send()
            .await
            .map_err(|e| MigrationError::SourceApi {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(MigrationError::SourceApi {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        response.json::<T>().await.map_err(|e| MigrationError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// Every result of a paginated listing, fetched lazily.
    fn get_list<'a, T>(
        &'a self,
        url: String,
        expand: Option<&'static str>,
    ) -> BoxStream<'a, Result<T, MigrationError>>
    where
        T: DeserializeOwned + Send + 'a,
    {
        stream::try_unfold(Some(0usize), move |start| {
            let url = url.clone();
            async move {
                let Some(start) = start else {
                    return Ok::<_, MigrationError>(None);
                };
                let mut query = vec![("start", start.to_string())];
                if let Some(expand) = expand {
                    query.push(("expand", expand.to_string()));
                }
                let page: ListPage<T> = self.get_json(&url, &query).await?;
                let next = page.next_start(start);
                let items = page.results.into_iter().map(Ok::<T, MigrationError>);
                Ok(Some((stream::iter(items), next)))
            }
        })
        .try_flatten()
        .boxed()
    }
}

#[async_trait]
impl SourceStore for ConfluenceClient {
    fn list_collections(&self) -> BoxStream<'_, Result<Collection, MigrationError>> {
        let url = format!("{}/rest/api/space", self.base_url);
        self.get_list::<SpaceJson>(url, None)
            .try_filter_map(|space| async move {
                match space.expandable.homepage {
                    Some(homepage_ref) => Ok(Some(Collection {
                        key: space.key,
                        name: space.name,
                        homepage_ref,
                    })),
                    None => {
                        warn!("Space '{}' ({}) has no homepage, skipping", space.name, space.key);
                        Ok(None)
                    }
                }
            })
            .boxed()
    }

    async fn get_page(&self, page_ref: &str) -> Result<PageContent, MigrationError> {
        let url = self.resolve(page_ref);
        debug!("GET {}", url);
        let response = self
            .request(&url)
            .query(&[("expand", PAGE_EXPAND)])
            .send()
            .await
            .map_err(|e| MigrationError::PageLookup {
                page_ref: page_ref.to_string(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        let body: serde_json::Value = response.json().await.map_err(|e| MigrationError::Decode {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        if !status.is_success() {
            return Err(MigrationError::PageLookup {
                page_ref: page_ref.to_string(),
                detail: format!("HTTP {}: {}", status, body),
            });
        }
        page_from_json(page_ref, body)
    }

    fn list_children<'a>(
        &'a self,
        page: &'a PageContent,
    ) -> BoxStream<'a, Result<PageContent, MigrationError>> {
        let url = self.resolve(&format!("{}/page", page.children_ref));
        self.get_list::<PageJson>(url, Some(PAGE_EXPAND))
            .map_ok(PageJson::into_content)
            .boxed()
    }

    async fn list_attachments(&self, page: &PageContent) -> Result<Vec<Attachment>, MigrationError> {
        let url = self.resolve(&format!("{}/attachment", page.children_ref));
        let listing: ListPage<AttachmentJson> = self.get_json(&url, &[]).await?;
        if listing.next_start(listing.start).is_some() {
            warn!(
                "Page '{}' has more than {} attachments; only the first {} are indexed",
                page.title, listing.limit, listing.limit
            );
        }
        Ok(listing.results.into_iter().map(AttachmentJson::into_attachment).collect())
    }

    async fn fetch_resource(&self, locator: &str) -> Result<LocalResource, MigrationError> {
        let url = self.resolve(locator);
        let auth = BasicAuth {
            username: &self.credentials.username,
            password: &self.credentials.api_token,
        };
        fetch::download(&self.http, &url, Some(auth), self.download_timeout_secs).await
    }
}

// ── Wire format ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ListPage<T> {
    results: Vec<T>,
    #[serde(default)]
    start: usize,
    #[serde(default)]
    limit: usize,
    #[serde(default)]
    size: usize,
}

impl<T> ListPage<T> {
    /// Start offset of the next page, if there is one.
    fn next_start(&self, start: usize) -> Option<usize> {
        if self.limit == 0 || self.results.is_empty() || start + self.limit >= self.size {
            None
        } else {
            Some(start + self.limit)
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpaceJson {
    key: String,
    name: String,
    #[serde(rename = "_expandable", default)]
    expandable: SpaceExpandable,
}

#[derive(Debug, Default, Deserialize)]
struct SpaceExpandable {
    homepage: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageJson {
    id: String,
    title: String,
    #[serde(default)]
    body: Option<PageBody>,
    #[serde(rename = "_expandable", default)]
    expandable: PageExpandable,
}

#[derive(Debug, Deserialize)]
struct PageBody {
    export_view: Option<StorageValue>,
}

#[derive(Debug, Deserialize)]
struct StorageValue {
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct PageExpandable {
    children: Option<String>,
}

impl PageJson {
    fn into_content(self) -> PageContent {
        // With `expand=children` the link moves out of `_expandable`.
        let children_ref = self
            .expandable
            .children
            .unwrap_or_else(|| format!("/rest/api/content/{}/child", self.id));
        PageContent {
            body_html: self
                .body
                .and_then(|b| b.export_view)
                .map(|v| v.value)
                .unwrap_or_default(),
            id: self.id,
            title: self.title,
            children_ref,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AttachmentJson {
    title: String,
    #[serde(rename = "_links")]
    links: AttachmentLinks,
}

#[derive(Debug, Deserialize)]
struct AttachmentLinks {
    webui: String,
    download: String,
}

impl AttachmentJson {
    fn into_attachment(self) -> Attachment {
        Attachment {
            title: self.title,
            web_link_key: self.links.webui,
            download_locator: self.links.download,
        }
    }
}

/// Decode a page response. Confluence reports some failures with a 200
/// and a `statusCode` field in the body.
fn page_from_json(page_ref: &str, body: serde_json::Value) -> Result<PageContent, MigrationError> {
    if let Some(code) = body.get("statusCode").and_then(|c| c.as_u64()) {
        if code > 299 {
            return Err(MigrationError::PageLookup {
                page_ref: page_ref.to_string(),
                detail: body.to_string(),
            });
        }
    }
    serde_json::from_value::<PageJson>(body)
        .map(PageJson::into_content)
        .map_err(|e| MigrationError::Decode {
            url: page_ref.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> ConfluenceClient {
        ConfluenceClient::new(
            "https://acme.atlassian.net/wiki/",
            Credentials::new("me@acme.com", "token"),
            &MigrationConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_locators() {
        let c = client();
        assert_eq!(c.base_url(), "https://acme.atlassian.net/wiki");
        assert_eq!(
            c.resolve("/rest/api/content/1"),
            "https://acme.atlassian.net/wiki/rest/api/content/1"
        );
        assert_eq!(c.resolve("https://cdn.example.com/a.png"), "https://cdn.example.com/a.png");
        assert_eq!(c.resolve("download/x"), "https://acme.atlassian.net/wiki/download/x");
        assert_eq!(
            c.resolve("/wiki/download/attachments/1/a.png"),
            "https://acme.atlassian.net/wiki/download/attachments/1/a.png"
        );
        assert_eq!(
            c.resolve("/wikipedia/x"),
            "https://acme.atlassian.net/wiki/wikipedia/x"
        );
    }

    #[test]
    fn test_rejects_relative_base_url() {
        let err = ConfluenceClient::new("acme/wiki", Credentials::new("a", "b"), &MigrationConfig::default())
            .unwrap_err();
        assert!(matches!(err, MigrationError::InvalidConfig(_)));
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let dbg = format!("{:?}", Credentials::new("me", "s3cret"));
        assert!(!dbg.contains("s3cret"));
    }

    #[test]
    fn test_page_from_json() {
        let page = page_from_json(
            "/rest/api/content/42",
            json!({
                "id": "42",
                "title": "Home",
                "body": {"export_view": {"value": "<p>hi</p>"}},
                "_expandable": {"children": "/rest/api/content/42/child"}
            }),
        )
        .unwrap();
        assert_eq!(page.title, "Home");
        assert_eq!(page.body_html, "<p>hi</p>");
        assert_eq!(page.children_ref, "/rest/api/content/42/child");
    }

    #[test]
    fn test_page_children_ref_fallback() {
        let page = page_from_json("/x", json!({"id": "7", "title": "T"})).unwrap();
        assert_eq!(page.children_ref, "/rest/api/content/7/child");
        assert_eq!(page.body_html, "");
    }

    #[test]
    fn test_status_code_in_body_is_lookup_error() {
        let err = page_from_json("/x", json!({"statusCode": 404, "message": "No content found"}))
            .unwrap_err();
        assert!(matches!(err, MigrationError::PageLookup { .. }));
    }

    #[test]
    fn test_pagination_stops_at_size() {
        let page: ListPage<serde_json::Value> = serde_json::from_value(json!({
            "results": [1, 2],
            "start": 0,
            "limit": 2,
            "size": 2
        }))
        .unwrap();
        assert_eq!(page.next_start(0), None);

        let page: ListPage<serde_json::Value> = serde_json::from_value(json!({
            "results": [1, 2],
            "start": 0,
            "limit": 2,
            "size": 5
        }))
        .unwrap();
        assert_eq!(page.next_start(0), Some(2));
        assert_eq!(page.next_start(4), None);
    }

    #[test]
    fn test_attachment_links() {
        let a: AttachmentJson = serde_json::from_value(json!({
            "title": "a.pdf",
            "_links": {
                "webui": "/spaces/ENG/pages/1/Home?preview=/1/2/a.pdf",
                "download": "/download/attachments/1/a.pdf?api=v2"
            }
        }))
        .unwrap();
        let a = a.into_attachment();
        assert_eq!(a.web_link_key, "/spaces/ENG/pages/1/Home?preview=/1/2/a.pdf");
        assert_eq!(a.download_locator, "/download/attachments/1/a.pdf?api=v2");
    }
}
