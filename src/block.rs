//! Output data model: the tree of typed blocks produced by the converter.
//!
//! Handlers in [`crate::pipeline::dispatch`] never hold a global "current
//! page". They receive the parent block explicitly and call
//! [`Block::append`], which returns the freshly inserted child so nested
//! content (toggle bodies) can be appended under it in turn.

use crate::text::FormattedText;
use serde::{Deserialize, Serialize};

/// Every kind of block the target store understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Heading1,
    Heading2,
    Heading3,
    Text,
    BulletedListItem,
    NumberedListItem,
    ToDo,
    Quote,
    Callout,
    Code,
    Divider,
    TableOfContents,
    Toggle,
    Image,
    File,
    Audio,
    Video,
    Pdf,
    Page,
}

impl BlockKind {
    /// Heading block for a source heading level. The target has three
    /// heading levels; anything deeper collapses onto level 3.
    pub fn heading(level: u8) -> Self {
        match level {
            0 | 1 => BlockKind::Heading1,
            2 => BlockKind::Heading2,
            _ => BlockKind::Heading3,
        }
    }

    /// Block kinds whose content is an uploaded file.
    pub fn is_media(self) -> bool {
        matches!(
            self,
            BlockKind::Image | BlockKind::File | BlockKind::Audio | BlockKind::Video | BlockKind::Pdf
        )
    }

    /// Pick the media block kind for a MIME type.
    ///
    /// | MIME | Kind |
    /// |------|------|
    /// | `application/pdf` | [`BlockKind::Pdf`] |
    /// | `audio/*` | [`BlockKind::Audio`] |
    /// | `video/*` | [`BlockKind::Video`] |
    /// | `image/*` | [`BlockKind::Image`] |
    /// | anything else | [`BlockKind::File`] |
    pub fn for_mime(mime: &str) -> Self {
        if mime == "application/pdf" {
            BlockKind::Pdf
        } else if mime.starts_with("audio/") {
            BlockKind::Audio
        } else if mime.starts_with("video/") {
            BlockKind::Video
        } else if mime.starts_with("image/") {
            BlockKind::Image
        } else {
            BlockKind::File
        }
    }
}

/// A node in the output tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub title: FormattedText,
    /// Syntax-highlighting language (code blocks only).
    pub language: Option<String>,
    /// Resource locator of the file to upload (media kinds only).
    pub media: Option<String>,
    /// Nested blocks, in document order (toggles and pages).
    pub children: Vec<Block>,
}

impl Block {
    pub fn new(kind: BlockKind, title: impl Into<FormattedText>) -> Self {
        Self {
            kind,
            title: title.into(),
            language: None,
            media: None,
            children: Vec::new(),
        }
    }

    /// A block with no title (divider, table of contents).
    pub fn empty(kind: BlockKind) -> Self {
        Self::new(kind, FormattedText::new())
    }

    pub fn page(title: impl Into<FormattedText>) -> Self {
        Self::new(BlockKind::Page, title)
    }

    pub fn text(title: impl Into<FormattedText>) -> Self {
        Self::new(BlockKind::Text, title)
    }

    pub fn code(body: impl Into<FormattedText>, language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            ..Self::new(BlockKind::Code, body)
        }
    }

    /// A media block whose file will be fetched from `locator`.
    pub fn media(kind: BlockKind, locator: impl Into<String>) -> Self {
        Self {
            media: Some(locator.into()),
            ..Self::empty(kind)
        }
    }

    /// Append `child` as the last child and return it, so callers can keep
    /// appending underneath it.
    pub fn append(&mut self, child: Block) -> &mut Block {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Total number of blocks below this one (not counting `self`).
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_levels_collapse_onto_three() {
        assert_eq!(BlockKind::heading(1), BlockKind::Heading1);
        assert_eq!(BlockKind::heading(2), BlockKind::Heading2);
        assert_eq!(BlockKind::heading(3), BlockKind::Heading3);
        assert_eq!(BlockKind::heading(6), BlockKind::Heading3);
    }

    #[test]
    fn mime_selects_media_kind() {
        assert_eq!(BlockKind::for_mime("application/pdf"), BlockKind::Pdf);
        assert_eq!(BlockKind::for_mime("audio/mpeg"), BlockKind::Audio);
        assert_eq!(BlockKind::for_mime("video/mp4"), BlockKind::Video);
        assert_eq!(BlockKind::for_mime("image/png"), BlockKind::Image);
        assert_eq!(BlockKind::for_mime("application/zip"), BlockKind::File);
        assert_eq!(BlockKind::for_mime("text/plain"), BlockKind::File);
    }

    #[test]
    fn append_returns_new_parent() {
        let mut page = Block::page("Home");
        let toggle = page.append(Block::new(BlockKind::Toggle, "More"));
        toggle.append(Block::text("hidden"));
        page.append(Block::empty(BlockKind::Divider));

        assert_eq!(page.children.len(), 2);
        assert_eq!(page.children[0].children.len(), 1);
        assert_eq!(page.descendant_count(), 3);
    }
}
