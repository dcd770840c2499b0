//! Node dispatcher: page body markup → block tree.
//!
//! Every top-level node is classified into a [`NodeKind`] by tag, then by
//! classes, and handed to that kind's handler. Handlers receive the block
//! they write into as an explicit `parent` and may append nested content
//! under the block they create (toggles). Containers that carry no meaning
//! of their own (`div.table-wrap`, `div.contentLayout2`, nested `div`s)
//! recurse through [`BodyConverter::convert`] so their contents are
//! classified like top-level nodes.
//!
//! Conversion is synchronous and touches no network: media blocks carry a
//! resource locator and are uploaded later by the page walker.

use crate::block::{Block, BlockKind};
use crate::config::BlankLines;
use crate::error::Diagnostic;
use crate::pipeline::attachments::{file_name_from_locator, guess_mime, is_preview_link, AttachmentIndex};
use crate::pipeline::inline;
use crate::pipeline::markup::{parse_fragment, tag, tag_with_class, MarkupNode};
use crate::pipeline::table;
use crate::text::FormattedText;
use tracing::{debug, warn};

/// Language tag given to code blocks with no recognised `brush`.
pub const PLAIN_TEXT: &str = "plain text";

/// The blocks converted from one page body, plus everything that was
/// recovered along the way.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    pub blocks: Vec<Block>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Convert a page body into blocks.
pub fn convert_body(html: &str, index: &AttachmentIndex, blank_lines: BlankLines) -> Conversion {
    let mut converter = BodyConverter::new(index, blank_lines);
    let mut root = Block::page(FormattedText::new());
    for node in parse_fragment(html) {
        converter.convert(&node, &mut root);
    }
    debug!(
        "Converted body into {} top-level blocks ({} diagnostics)",
        root.children.len(),
        converter.diagnostics.len()
    );
    Conversion {
        blocks: root.children,
        diagnostics: converter.into_diagnostics(),
    }
}

// ── Classification ───────────────────────────────────────────────────────

/// What a markup node converts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Heading(u8),
    Divider,
    TaskList,
    ChildPagesMacro,
    BulletedList,
    NumberedList,
    InfoMacro,
    CodeMacro,
    ContentLayout,
    TableWrap,
    Expand,
    TocMacro,
    /// `div` with nested `div`s.
    DivContainer,
    /// `div` without nested `div`s.
    DivLeaf,
    Paragraph,
    Table,
    Blockquote,
    EmbeddedFile,
    Span,
    Style,
    Text,
    /// Any other element; rendered as text.
    Other,
}

impl NodeKind {
    pub fn classify(node: &MarkupNode) -> NodeKind {
        let Some(tag_name) = node.tag() else {
            return NodeKind::Text;
        };
        match tag_name {
            "h1" => NodeKind::Heading(1),
            "h2" => NodeKind::Heading(2),
            "h3" => NodeKind::Heading(3),
            "h4" | "h5" | "h6" => NodeKind::Heading(3),
            "hr" => NodeKind::Divider,
            "ul" if node.has_class("inline-task-list") => NodeKind::TaskList,
            "ul" if node.has_class("childpages-macro") => NodeKind::ChildPagesMacro,
            "ul" => NodeKind::BulletedList,
            "ol" => NodeKind::NumberedList,
            "div" => classify_div(node),
            "pre" => NodeKind::CodeMacro,
            "p" => NodeKind::Paragraph,
            "table" => NodeKind::Table,
            "blockquote" => NodeKind::Blockquote,
            "span" if node.has_class("confluence-embedded-file-wrapper") => NodeKind::EmbeddedFile,
            "span" => NodeKind::Span,
            "style" => NodeKind::Style,
            _ => NodeKind::Other,
        }
    }
}

fn classify_div(node: &MarkupNode) -> NodeKind {
    if node.has_class("confluence-information-macro") {
        NodeKind::InfoMacro
    } else if node.has_class("code") {
        NodeKind::CodeMacro
    } else if node.has_class("contentLayout2") {
        NodeKind::ContentLayout
    } else if node.has_class("table-wrap") {
        NodeKind::TableWrap
    } else if node.has_class("expand-container") {
        NodeKind::Expand
    } else if node.has_class("toc-macro") {
        NodeKind::TocMacro
    } else if node.find(tag("div")).is_some() {
        NodeKind::DivContainer
    } else {
        NodeKind::DivLeaf
    }
}

type Handler<'a> = fn(&mut BodyConverter<'a>, &MarkupNode, &mut Block);

fn handler<'a>(kind: NodeKind) -> Handler<'a> {
    match kind {
        NodeKind::Heading(_) => BodyConverter::heading,
        NodeKind::Divider => BodyConverter::divider,
        NodeKind::TaskList => BodyConverter::task_list,
        NodeKind::ChildPagesMacro | NodeKind::Style => BodyConverter::skip,
        NodeKind::BulletedList => BodyConverter::bulleted_list,
        NodeKind::NumberedList => BodyConverter::numbered_list,
        NodeKind::InfoMacro => BodyConverter::info_macro,
        NodeKind::CodeMacro => BodyConverter::code,
        NodeKind::ContentLayout => BodyConverter::content_layout,
        NodeKind::TableWrap => BodyConverter::table_wrap,
        NodeKind::Expand => BodyConverter::expand,
        NodeKind::TocMacro => BodyConverter::toc,
        NodeKind::DivContainer => BodyConverter::nested_divs,
        NodeKind::DivLeaf | NodeKind::Paragraph => BodyConverter::paragraph,
        NodeKind::Table => BodyConverter::table,
        NodeKind::Blockquote => BodyConverter::blockquote,
        NodeKind::EmbeddedFile => BodyConverter::embedded_file,
        NodeKind::Span | NodeKind::Text | NodeKind::Other => BodyConverter::text,
    }
}

// ── Converter ────────────────────────────────────────────────────────────

/// Conversion state for one page body.
pub struct BodyConverter<'a> {
    index: &'a AttachmentIndex,
    blank_lines: BlankLines,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> BodyConverter<'a> {
    pub fn new(index: &'a AttachmentIndex, blank_lines: BlankLines) -> Self {
        Self {
            index,
            blank_lines,
            diagnostics: Vec::new(),
        }
    }

    /// Convert `node` and append the result under `parent`.
    pub fn convert(&mut self, node: &MarkupNode, parent: &mut Block) {
        let kind = NodeKind::classify(node);
        handler(kind)(self, node, parent);
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn heading(&mut self, node: &MarkupNode, parent: &mut Block) {
        let level = match NodeKind::classify(node) {
            NodeKind::Heading(level) => level,
            _ => 3,
        };
        parent.append(Block::new(BlockKind::heading(level), inline::normalize(node)));
    }

    fn divider(&mut self, _node: &MarkupNode, parent: &mut Block) {
        parent.append(Block::empty(BlockKind::Divider));
    }

    fn skip(&mut self, _node: &MarkupNode, _parent: &mut Block) {}

    fn task_list(&mut self, node: &MarkupNode, parent: &mut Block) {
        list_items(node, BlockKind::ToDo, parent);
    }

    fn bulleted_list(&mut self, node: &MarkupNode, parent: &mut Block) {
        list_items(node, BlockKind::BulletedListItem, parent);
    }

    fn numbered_list(&mut self, node: &MarkupNode, parent: &mut Block) {
        list_items(node, BlockKind::NumberedListItem, parent);
    }

    fn info_macro(&mut self, node: &MarkupNode, parent: &mut Block) {
        parent.append(Block::new(BlockKind::Callout, inline::normalize(node)));
    }

    fn code(&mut self, node: &MarkupNode, parent: &mut Block) {
        let pre = if node.is("pre") {
            Some(node)
        } else {
            node.find(tag("pre"))
        };
        let (body, language) = match pre {
            Some(pre) => (
                pre.text_content(),
                pre.attr("data-syntaxhighlighter-params")
                    .and_then(brush_of)
                    .map(notion_language)
                    .unwrap_or(PLAIN_TEXT),
            ),
            None => (node.text_content(), PLAIN_TEXT),
        };
        parent.append(Block::code(body, language));
    }

    fn content_layout(&mut self, node: &MarkupNode, parent: &mut Block) {
        for cell in node.find_outermost(|n: &MarkupNode| n.has_class("innerCell")) {
            for child in &cell.children {
                self.convert(child, parent);
            }
        }
    }

    fn table_wrap(&mut self, node: &MarkupNode, parent: &mut Block) {
        for t in node.find_outermost(tag("table")) {
            self.table(t, parent);
        }
    }

    fn expand(&mut self, node: &MarkupNode, parent: &mut Block) {
        let title = node
            .find(tag_with_class("span", "expand-control-text"))
            .map(inline::normalize)
            .unwrap_or_default();
        let body = node
            .find(tag_with_class("div", "expand-content"))
            .map(inline::normalize);

        let toggle = parent.append(Block::new(BlockKind::Toggle, title));
        if let Some(body) = body {
            toggle.append(Block::text(body));
        }
    }

    fn toc(&mut self, _node: &MarkupNode, parent: &mut Block) {
        parent.append(Block::empty(BlockKind::TableOfContents));
    }

    fn nested_divs(&mut self, node: &MarkupNode, parent: &mut Block) {
        for div in node.find_outermost(tag("div")) {
            self.convert(div, parent);
        }
    }

    /// Attachment links first, then the remaining text.
    fn paragraph(&mut self, node: &MarkupNode, parent: &mut Block) {
        for anchor in node.find_all(attachment_anchor) {
            let href = anchor.attr("href").unwrap_or_default();
            match self.index.resolve(href) {
                Some(locator) => {
                    let kind = BlockKind::for_mime(guess_mime(&file_name_from_locator(locator)));
                    debug!("Attachment link {} -> {:?} block", href, kind);
                    parent.append(Block::media(kind, locator));
                }
                None => {
                    warn!(href = %href, "Attachment not found in page attachment listing, skipping");
                    self.diagnostics.push(Diagnostic::LookupMiss {
                        href: href.to_string(),
                    });
                }
            }
        }
        let stripped = node.without(attachment_anchor);
        self.emit_text(&stripped, parent);
    }

    fn table(&mut self, node: &MarkupNode, parent: &mut Block) {
        match table::serialize(node) {
            Ok(grid) => {
                parent.append(Block::code(grid, PLAIN_TEXT));
            }
            Err(e) => {
                warn!(reason = %e, "Malformed table, emitting its text instead");
                self.diagnostics.push(Diagnostic::MalformedStructure {
                    detail: e.to_string(),
                });
                self.emit_text(node, parent);
            }
        }
    }

    fn blockquote(&mut self, node: &MarkupNode, parent: &mut Block) {
        parent.append(Block::new(BlockKind::Quote, inline::normalize(node)));
    }

    fn embedded_file(&mut self, node: &MarkupNode, parent: &mut Block) {
        let src = node
            .find(tag("img"))
            .and_then(|img| img.attr("src"))
            .filter(|src| !src.trim().is_empty());
        match src {
            Some(src) if node.has_class("image-center-wrapper") => {
                parent.append(Block::media(BlockKind::Image, src));
            }
            _ => {
                warn!(classes = ?node.classes, "Unsupported embedded file, skipping");
                self.diagnostics.push(Diagnostic::UnsupportedConstruct {
                    classes: node.classes.clone(),
                });
            }
        }
    }

    fn text(&mut self, node: &MarkupNode, parent: &mut Block) {
        self.emit_text(node, parent);
    }

    /// One text block per line of the node's normalized text.
    fn emit_text(&mut self, node: &MarkupNode, parent: &mut Block) {
        let text = inline::normalize(node);
        if text.is_blank() {
            return;
        }
        for line in apply_blank_lines(text.split_lines(), self.blank_lines) {
            parent.append(Block::text(line));
        }
    }
}

fn attachment_anchor(node: &MarkupNode) -> bool {
    node.is("a") && node.attr("href").is_some_and(is_preview_link)
}

fn list_items(node: &MarkupNode, kind: BlockKind, parent: &mut Block) {
    for li in node.element_children().filter(|c| c.is("li")) {
        parent.append(Block::new(kind, inline::normalize(li)));
    }
}

/// Apply the blank-line policy to split lines: leading and trailing blank
/// lines are always dropped; interior runs become one empty line or vanish.
pub fn apply_blank_lines(lines: Vec<FormattedText>, policy: BlankLines) -> Vec<FormattedText> {
    let first = lines.iter().position(|l| !l.is_blank());
    let last = lines.iter().rposition(|l| !l.is_blank());
    let (Some(first), Some(last)) = (first, last) else {
        return Vec::new();
    };

    let mut out: Vec<FormattedText> = Vec::new();
    let mut in_blank_run = false;
    for line in lines.into_iter().take(last + 1).skip(first) {
        if line.is_blank() {
            if policy == BlankLines::Preserve && !in_blank_run {
                out.push(FormattedText::new());
            }
            in_blank_run = true;
        } else {
            out.push(line);
            in_blank_run = false;
        }
    }
    out
}

// ── Code languages ───────────────────────────────────────────────────────

/// Extract the `brush` value from `data-syntaxhighlighter-params`
/// (`brush: java; gutter: false; theme: Confluence`).
fn brush_of(params: &str) -> Option<&str> {
    params.split(';').find_map(|param| {
        let (key, value) = param.split_once(':')?;
        (key.trim() == "brush").then(|| value.trim())
    })
}

/// Map a Confluence brush name onto a Notion code language.
fn notion_language(brush: &str) -> &'static str {
    match brush.to_ascii_lowercase().as_str() {
        "bash" | "sh" | "shell" => "shell",
        "c" => "c",
        "cpp" | "c++" => "c++",
        "csharp" | "c#" | "cs" => "c#",
        "css" => "css",
        "diff" | "patch" => "diff",
        "go" | "golang" => "go",
        "groovy" => "groovy",
        "html" | "xhtml" => "html",
        "java" => "java",
        "javafx" | "jfx" => "java",
        "js" | "jscript" | "javascript" => "javascript",
        "json" => "json",
        "kotlin" | "kt" => "kotlin",
        "markdown" | "md" => "markdown",
        "perl" | "pl" => "perl",
        "php" => "php",
        "powershell" | "ps" => "powershell",
        "py" | "python" => "python",
        "ruby" | "rails" | "ror" | "rb" => "ruby",
        "rust" | "rs" => "rust",
        "scala" => "scala",
        "sql" => "sql",
        "swift" => "swift",
        "ts" | "typescript" => "typescript",
        "vb" | "vbnet" => "visual basic",
        "xml" | "xslt" => "xml",
        "yaml" | "yml" => "yaml",
        _ => PLAIN_TEXT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Attachment;

    fn convert(html: &str) -> Conversion {
        convert_body(html, &AttachmentIndex::default(), BlankLines::Preserve)
    }

    fn kinds(blocks: &[Block]) -> Vec<BlockKind> {
        blocks.iter().map(|b| b.kind).collect()
    }

    fn titles(blocks: &[Block]) -> Vec<String> {
        blocks.iter().map(|b| b.title.to_string()).collect()
    }

    #[test]
    fn test_classify_by_tag_then_class() {
        let nodes = parse_fragment(
            r#"<h5>x</h5><ul class="inline-task-list"></ul><ul class="childpages-macro"></ul><ul></ul><div class="code"></div><div><div></div></div><div></div><p>x</p><span class="confluence-embedded-file-wrapper"></span><span>x</span>"#,
        );
        let kinds: Vec<NodeKind> = nodes.iter().map(NodeKind::classify).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Heading(3),
                NodeKind::TaskList,
                NodeKind::ChildPagesMacro,
                NodeKind::BulletedList,
                NodeKind::CodeMacro,
                NodeKind::DivContainer,
                NodeKind::DivLeaf,
                NodeKind::Paragraph,
                NodeKind::EmbeddedFile,
                NodeKind::Span,
            ]
        );
    }

    #[test]
    fn test_headings_and_divider() {
        let out = convert("<h1>One</h1><h2>Two</h2><h3>Three</h3><h6>Six</h6><hr>");
        assert_eq!(
            kinds(&out.blocks),
            vec![
                BlockKind::Heading1,
                BlockKind::Heading2,
                BlockKind::Heading3,
                BlockKind::Heading3,
                BlockKind::Divider,
            ]
        );
        assert_eq!(out.blocks[3].title.to_string(), "Six");
    }

    #[test]
    fn test_lists_ignore_whitespace_between_items() {
        let out = convert("<ul>\n  <li>a</li>\n  <li>b</li>\n</ul><ol><li>one</li></ol>");
        assert_eq!(
            kinds(&out.blocks),
            vec![
                BlockKind::BulletedListItem,
                BlockKind::BulletedListItem,
                BlockKind::NumberedListItem,
            ]
        );
        assert_eq!(titles(&out.blocks), vec!["a", "b", "one"]);
    }

    #[test]
    fn test_child_pages_macro_and_style_are_skipped() {
        let out = convert(r#"<ul class="childpages-macro"><li>Child</li></ul><style>p{}</style>"#);
        assert!(out.blocks.is_empty());
    }

    #[test]
    fn test_code_macro_keeps_whitespace_and_language() {
        let out = convert(
            "<div class=\"code panel\"><div class=\"codeContent\"><pre data-syntaxhighlighter-params=\"brush: py; gutter: false\">def f():\n    return 1</pre></div></div>",
        );
        assert_eq!(out.blocks.len(), 1);
        assert_eq!(out.blocks[0].kind, BlockKind::Code);
        assert_eq!(out.blocks[0].title.plain_text(), "def f():\n    return 1");
        assert_eq!(out.blocks[0].language.as_deref(), Some("python"));
    }

    #[test]
    fn test_bare_pre_is_plain_text_code() {
        let out = convert("<pre>x  y</pre>");
        assert_eq!(out.blocks[0].language.as_deref(), Some(PLAIN_TEXT));
        assert_eq!(out.blocks[0].title.plain_text(), "x  y");
    }

    #[test]
    fn test_info_macro_is_callout() {
        let out = convert(
            r#"<div class="confluence-information-macro confluence-information-macro-note"><div class="confluence-information-macro-body"><p>Careful</p></div></div>"#,
        );
        assert_eq!(kinds(&out.blocks), vec![BlockKind::Callout]);
        assert_eq!(out.blocks[0].title.to_string(), "Careful");
    }

    #[test]
    fn test_content_layout_flattens_inner_cells() {
        let out = convert(
            r#"<div class="contentLayout2"><div class="columnLayout"><div class="cell normal"><div class="innerCell"><h2>Left</h2><p>l</p></div></div><div class="cell"><div class="innerCell"><p>r</p></div></div></div></div>"#,
        );
        assert_eq!(
            kinds(&out.blocks),
            vec![BlockKind::Heading2, BlockKind::Text, BlockKind::Text]
        );
        assert_eq!(titles(&out.blocks), vec!["Left", "l", "r"]);
    }

    #[test]
    fn test_nested_divs_are_converted_once() {
        let out = convert("<div><div><div><p>deep</p></div></div><div>side</div></div>");
        assert_eq!(titles(&out.blocks), vec!["deep", "side"]);
    }

    #[test]
    fn test_div_inside_paragraph_is_converted_as_sibling() {
        // The parser closes the `p` at the `div`, so both come out top-level.
        let nodes = parse_fragment("<p>lead<div>inner</div></p>");
        assert!(nodes.iter().all(|n| n.find(tag("div")).is_none()));
        let out = convert("<p>lead<div>inner</div></p>");
        assert_eq!(kinds(&out.blocks), vec![BlockKind::Text, BlockKind::Text]);
        assert_eq!(titles(&out.blocks), vec!["lead", "inner"]);
    }

    #[test]
    fn test_table_wrap_becomes_grid() {
        let out = convert(
            r#"<div class="table-wrap"><table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table></div>"#,
        );
        assert_eq!(out.blocks.len(), 1);
        assert_eq!(out.blocks[0].kind, BlockKind::Code);
        assert_eq!(out.blocks[0].language.as_deref(), Some(PLAIN_TEXT));
        assert!(out.blocks[0].title.plain_text().contains("| A | B |"));
    }

    #[test]
    fn test_malformed_table_falls_back_to_text() {
        let out = convert("<table><tr><th>A</th><th>B</th></tr><tr><td>only</td></tr></table>");
        assert!(out.blocks.iter().all(|b| b.kind == BlockKind::Text));
        assert!(titles(&out.blocks).iter().any(|t| t.contains("only")));
        assert!(matches!(
            out.diagnostics.as_slice(),
            [Diagnostic::MalformedStructure { .. }]
        ));
    }

    #[test]
    fn test_expand_becomes_toggle_with_one_child() {
        let out = convert(
            r#"<div class="expand-container"><div class="expand-control"><span class="expand-control-text">Details</span></div><div class="expand-content"><p>Hidden <b>text</b></p></div></div>"#,
        );
        assert_eq!(out.blocks.len(), 1);
        let toggle = &out.blocks[0];
        assert_eq!(toggle.kind, BlockKind::Toggle);
        assert_eq!(toggle.title.to_string(), "Details");
        assert_eq!(toggle.children.len(), 1);
        assert_eq!(toggle.children[0].title.to_string(), "Hidden **text**");
    }

    #[test]
    fn test_expand_without_label_or_body() {
        let out = convert(r#"<div class="expand-container"></div>"#);
        assert_eq!(out.blocks[0].kind, BlockKind::Toggle);
        assert!(out.blocks[0].title.is_empty());
        assert!(out.blocks[0].children.is_empty());
    }

    #[test]
    fn test_toc_and_blockquote() {
        let out = convert(r#"<div class="toc-macro"><ul><li>x</li></ul></div><blockquote>said</blockquote>"#);
        assert_eq!(kinds(&out.blocks), vec![BlockKind::TableOfContents, BlockKind::Quote]);
        assert_eq!(out.blocks[1].title.to_string(), "said");
    }

    #[test]
    fn test_attachment_hit_and_miss() {
        let index = AttachmentIndex::new(
            &[Attachment {
                title: "spec.pdf".into(),
                web_link_key: "/spaces/ENG/pages/1/Home?preview=/1/2/spec.pdf".into(),
                download_locator: "/download/attachments/1/spec.pdf?api=v2".into(),
            }],
            "/wiki",
        );
        let out = convert_body(
            r#"<p>See <a href="/wiki/spaces/ENG/pages/1/Home?preview=/1/2/spec.pdf">spec.pdf</a> and <a href="/wiki/spaces/ENG/pages/1/Home?preview=/1/2/gone.png">gone.png</a> here</p>"#,
            &index,
            BlankLines::Preserve,
        );
        assert_eq!(kinds(&out.blocks), vec![BlockKind::Pdf, BlockKind::Text]);
        assert_eq!(
            out.blocks[0].media.as_deref(),
            Some("/download/attachments/1/spec.pdf?api=v2")
        );
        let text = out.blocks[1].title.to_string();
        assert!(!text.contains("spec.pdf"));
        assert!(!text.contains("gone.png"));
        assert_eq!(
            out.diagnostics,
            vec![Diagnostic::LookupMiss {
                href: "/wiki/spaces/ENG/pages/1/Home?preview=/1/2/gone.png".into()
            }]
        );
    }

    #[test]
    fn test_embedded_image_and_unsupported_variant() {
        let out = convert(
            r#"<span class="confluence-embedded-file-wrapper image-center-wrapper"><img class="confluence-embedded-image" src="https://wiki/download/x.png"></span><span class="confluence-embedded-file-wrapper"><img src="https://wiki/download/y.png"></span>"#,
        );
        assert_eq!(kinds(&out.blocks), vec![BlockKind::Image]);
        assert_eq!(out.blocks[0].media.as_deref(), Some("https://wiki/download/x.png"));
        assert!(matches!(
            out.diagnostics.as_slice(),
            [Diagnostic::UnsupportedConstruct { .. }]
        ));
    }

    #[test]
    fn test_text_nodes_and_unknown_tags() {
        let out = convert("loose text<section>inside</section>   ");
        assert_eq!(titles(&out.blocks), vec!["loose text", "inside"]);
    }

    #[test]
    fn test_blank_line_policy() {
        let html = "<div><p>a</p><p>b</p></div>";
        let keep = convert_body(html, &AttachmentIndex::default(), BlankLines::Preserve);
        assert_eq!(titles(&keep.blocks), vec!["a", "", "b"]);
        let drop = convert_body(html, &AttachmentIndex::default(), BlankLines::Drop);
        assert_eq!(titles(&drop.blocks), vec!["a", "b"]);
    }

    #[test]
    fn test_apply_blank_lines_collapses_runs() {
        let lines: Vec<FormattedText> = ["", "a", "", "", "b", ""]
            .into_iter()
            .map(FormattedText::from)
            .collect();
        let out: Vec<String> = apply_blank_lines(lines, BlankLines::Preserve)
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(out, vec!["a", "", "b"]);
    }

    #[test]
    fn test_brush_mapping() {
        assert_eq!(brush_of("brush: java; gutter: false"), Some("java"));
        assert_eq!(brush_of("gutter: true"), None);
        assert_eq!(notion_language("bash"), "shell");
        assert_eq!(notion_language("unknown"), PLAIN_TEXT);
    }
}
