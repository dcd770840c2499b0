//! Attachment index and attachment-link helpers.
//!
//! Confluence renders a link to a page attachment as a "preview" URL:
//!
//! ```text
//! /wiki/spaces/ENG/pages/123456/Runbook?preview=/123456/789/diagram.pdf
//! ```
//!
//! The attachment listing of the same page reports that URL (minus the
//! `/wiki` prefix) as the attachment's `webui` link, next to its download
//! locator. [`AttachmentIndex`] maps one onto the other for a single page.

use crate::source::Attachment;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static PREVIEW_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/spaces/(.+)/pages/(.+)\?preview=(.+)").expect("valid preview link regex")
});

/// `true` when `href` points at a page attachment preview.
pub fn is_preview_link(href: &str) -> bool {
    PREVIEW_LINK.is_match(href)
}

/// Lookup from an attachment's in-document link to its download locator.
///
/// Built from one page's attachment listing and dropped with that page's
/// conversion.
#[derive(Debug, Clone, Default)]
pub struct AttachmentIndex {
    link_prefix: String,
    entries: HashMap<String, String>,
}

impl AttachmentIndex {
    /// Build the index for one page. `link_prefix` is stripped from links in
    /// the page body before lookup (`/wiki` on Confluence Cloud).
    pub fn new(attachments: &[Attachment], link_prefix: impl Into<String>) -> Self {
        let entries = attachments
            .iter()
            .map(|a| (a.web_link_key.clone(), a.download_locator.clone()))
            .collect();
        Self {
            link_prefix: link_prefix.into(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalise an in-document `href` into an index key: absolute URLs are
    /// reduced to path + query, then the link prefix is removed from the
    /// front once.
    pub fn key_for(&self, href: &str) -> String {
        let path = match reqwest::Url::parse(href) {
            Ok(url) => match url.query() {
                Some(q) => format!("{}?{}", url.path(), q),
                None => url.path().to_string(),
            },
            Err(_) => href.to_string(),
        };
        if self.link_prefix.is_empty() {
            return path;
        }
        match path.strip_prefix(self.link_prefix.as_str()) {
            Some(rest) if rest.starts_with('/') => rest.to_string(),
            _ => path,
        }
    }

    /// Download locator for an in-document attachment link.
    pub fn resolve(&self, href: &str) -> Option<&str> {
        self.entries.get(&self.key_for(href)).map(String::as_str)
    }
}

/// File name a locator downloads to: the last path segment, `+` read as a
/// space and percent-decoded. Path separators produced by decoding are
/// replaced so the name stays inside its directory.
pub fn file_name_from_locator(locator: &str) -> String {
    let path = locator.split(['?', '#']).next().unwrap_or_default();
    let segment = path.rsplit('/').next().unwrap_or_default();
    let spaced = segment.replace('+', " ");
    let decoded = urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced);
    let name: String = decoded
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    let name = name.trim();
    if name.is_empty() || name == "." || name == ".." {
        "attachment".to_string()
    } else {
        name.to_string()
    }
}

const MIME_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    // images
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("ico", "image/x-icon"),
    ("heic", "image/heic"),
    // audio
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("flac", "audio/flac"),
    ("wma", "audio/x-ms-wma"),
    // video
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mov", "video/quicktime"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("mkv", "video/x-matroska"),
    ("ogv", "video/ogg"),
    ("wmv", "video/x-ms-wmv"),
    ("flv", "video/x-flv"),
    // documents
    ("txt", "text/plain"),
    ("csv", "text/csv"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("zip", "application/zip"),
    ("doc", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
];

/// MIME type guessed from a file name's extension.
pub fn guess_mime(file_name: &str) -> &'static str {
    let ext = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return "application/octet-stream",
    };
    MIME_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or("application/octet-stream")
}
