//! Inline markup normalizer: a node's inner markup → [`FormattedText`].
//!
//! Emphasis, strikethrough, inline code and hyperlinks become span marks.
//! Block-level elements only contribute line breaks, so the caller can split
//! the result into one block per line.
//!
//! Two overrides apply before the generic rules:
//!
//! 1. `img.emoticon` renders as its `data-emoji-fallback` glyph (Confluence
//!    emoji are images), never as an image reference.
//! 2. `code` renders its plain text as a single inline-code span, whatever
//!    markup Confluence nested inside it.

use crate::pipeline::markup::MarkupNode;
use crate::text::{FormattedText, Marks};

/// Render `node` as formatted text, trimmed at both ends.
///
/// The node's own tag is stripped when it is a heading or a list item: only
/// its content is rendered, without a list marker or surrounding breaks.
pub fn normalize(node: &MarkupNode) -> FormattedText {
    let mut renderer = Renderer::default();
    let marks = Marks::default();
    if is_stripped_tag(node.tag()) {
        renderer.render_children(node, &marks);
    } else {
        renderer.render(node, &marks);
    }
    renderer.out.trim()
}

/// Render a node's plain text, whitespace collapsed and trimmed.
pub fn plain(node: &MarkupNode) -> String {
    normalize(node).plain_text()
}

fn is_stripped_tag(tag: Option<&str>) -> bool {
    matches!(tag, Some("h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li"))
}

/// How an element affects line layout.
enum Layout {
    /// Separated from its neighbours by a blank line.
    Paragraph,
    /// Starts and ends on its own line.
    Line,
    /// Flows with the surrounding text.
    Inline,
}

fn layout_of(tag: &str) -> Layout {
    match tag {
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" | "pre" | "table" | "ul"
        | "ol" | "dl" | "hr" => Layout::Paragraph,
        "div" | "section" | "article" | "header" | "footer" | "aside" | "nav" | "li" | "tr"
        | "dt" | "dd" | "figure" | "figcaption" | "caption" => Layout::Line,
        _ => Layout::Inline,
    }
}

struct ListContext {
    ordered: bool,
    next: usize,
}

#[derive(Default)]
struct Renderer {
    out: FormattedText,
    in_pre: bool,
    lists: Vec<ListContext>,
}

impl Renderer {
    fn render(&mut self, node: &MarkupNode, marks: &Marks) {
        let Some(tag) = node.tag() else {
            self.render_text(node.text.as_deref().unwrap_or_default(), marks);
            return;
        };

        match tag {
            "style" | "script" | "head" | "title" | "template" => {}
            "br" => self.out.push("\n", &Marks::default()),
            "hr" => {
                self.blank_line();
                self.out.push("---", &Marks::default());
                self.blank_line();
            }
            "img" => self.render_image(node, marks),
            "code" | "kbd" | "samp" | "tt" if !self.in_pre => {
                let text = node.text_content();
                if !text.is_empty() {
                    let code = Marks {
                        code: true,
                        ..marks.clone()
                    };
                    self.out.push(text, &code);
                }
            }
            _ => self.render_element(tag, node, marks),
        }
    }

    fn render_element(&mut self, tag: &str, node: &MarkupNode, marks: &Marks) {
        let layout = layout_of(tag);
        match layout {
            Layout::Paragraph => self.blank_line(),
            Layout::Line => self.newline(),
            Layout::Inline => {}
        }

        let mut inner = marks.clone();
        match tag {
            "strong" | "b" => inner.bold = true,
            "em" | "i" | "cite" | "var" => inner.italic = true,
            "s" | "del" | "strike" => inner.strikethrough = true,
            "a" => {
                if let Some(href) = node.attr("href").filter(|h| !h.trim().is_empty()) {
                    inner.link = Some(href.trim().to_string());
                }
            }
            _ => {}
        }

        match tag {
            "ul" | "ol" => {
                self.lists.push(ListContext {
                    ordered: tag == "ol",
                    next: 1,
                });
                self.render_children(node, &inner);
                self.lists.pop();
            }
            "li" => {
                let marker = match self.lists.last_mut() {
                    Some(list) if list.ordered => {
                        let n = list.next;
                        list.next += 1;
                        format!("{}. ", n)
                    }
                    _ => "- ".to_string(),
                };
                self.out.push(marker, &Marks::default());
                self.render_children(node, &inner);
            }
            "tr" => {
                let mut first = true;
                for cell in node.element_children() {
                    if !first {
                        self.out.push(" | ", &Marks::default());
                    }
                    first = false;
                    self.render_children(cell, &inner);
                }
            }
            "pre" => {
                let was_pre = self.in_pre;
                self.in_pre = true;
                self.render_children(node, &inner);
                self.in_pre = was_pre;
            }
            _ => self.render_children(node, &inner),
        }

        match layout {
            Layout::Paragraph => self.blank_line(),
            Layout::Line => self.newline(),
            Layout::Inline => {}
        }
    }

    fn render_children(&mut self, node: &MarkupNode, marks: &Marks) {
        for child in &node.children {
            self.render(child, marks);
        }
    }

    fn render_text(&mut self, text: &str, marks: &Marks) {
        if self.in_pre {
            self.out.push(text, marks);
            return;
        }
        let mut collapsed = collapse_whitespace(text);
        if collapsed.starts_with(' ') && self.out.ends_with_whitespace() {
            collapsed.remove(0);
        }
        self.out.push(collapsed, marks);
    }

    fn render_image(&mut self, node: &MarkupNode, marks: &Marks) {
        if node.has_class("emoticon") {
            let glyph = node
                .attr("data-emoji-fallback")
                .or_else(|| node.attr("alt"))
                .unwrap_or_default();
            self.out.push(glyph, marks);
            return;
        }
        if let Some(src) = node.attr("src") {
            let alt = node.attr("alt").unwrap_or_default();
            self.out.push(format!("![{}]({})", alt, src), marks);
        }
    }

    /// Start a new line unless already at one.
    fn newline(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with_newline() {
            self.out.push("\n", &Marks::default());
        }
    }

    /// Leave exactly one blank line unless at the very start.
    fn blank_line(&mut self) {
        if self.out.is_empty() {
            return;
        }
        let have = self.out.trailing_newlines();
        if have < 2 {
            self.out.push("\n".repeat(2 - have), &Marks::default());
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}
