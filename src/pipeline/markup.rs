//! Markup tree: an owned, immutable copy of Confluence's exported HTML.
//!
//! Parsing goes through `scraper` (html5ever), then the DOM is copied into
//! plain [`MarkupNode`] values. Nothing downstream depends on `scraper`, and
//! the tree can be held across `.await` points without borrowing a parser.

use scraper::{ElementRef, Html, Node};
use std::collections::BTreeMap;

/// A node of the parsed source tree. Element nodes carry a `tag`; text
/// nodes carry `text` and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupNode {
    pub tag: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<MarkupNode>,
    pub text: Option<String>,
}

impl MarkupNode {
    /// A text node.
    pub fn text_node(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn is_text(&self) -> bool {
        self.tag.is_none()
    }

    pub fn is_element(&self) -> bool {
        self.tag.is_some()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.as_deref() == Some(tag)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Element children only, skipping text between them.
    pub fn element_children(&self) -> impl Iterator<Item = &MarkupNode> {
        self.children.iter().filter(|c| c.is_element())
    }

    /// Concatenated text of every descendant text node, unmodified.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(ref t) = self.text {
            out.push_str(t);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// First descendant (excluding `self`) matching `pred`, in document order.
    pub fn find<F>(&self, pred: F) -> Option<&MarkupNode>
    where
        F: Fn(&MarkupNode) -> bool + Copy,
    {
        for child in &self.children {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find(pred) {
                return Some(found);
            }
        }
        None
    }

    /// Every descendant (excluding `self`) matching `pred`, in document order.
    pub fn find_all<F>(&self, pred: F) -> Vec<&MarkupNode>
    where
        F: Fn(&MarkupNode) -> bool + Copy,
    {
        let mut out = Vec::new();
        self.walk_matches(pred, true, &mut out);
        out
    }

    /// Descendants matching `pred` that are not themselves inside another
    /// match. A nested match is reached through its outer match instead.
    pub fn find_outermost<F>(&self, pred: F) -> Vec<&MarkupNode>
    where
        F: Fn(&MarkupNode) -> bool + Copy,
    {
        let mut out = Vec::new();
        self.walk_matches(pred, false, &mut out);
        out
    }

    fn walk_matches<'a, F>(&'a self, pred: F, descend_into_matches: bool, out: &mut Vec<&'a MarkupNode>)
    where
        F: Fn(&MarkupNode) -> bool + Copy,
    {
        for child in &self.children {
            let matched = pred(child);
            if matched {
                out.push(child);
            }
            if !matched || descend_into_matches {
                child.walk_matches(pred, descend_into_matches, out);
            }
        }
    }

    /// A copy of this node with every descendant matching `pred` removed,
    /// together with its subtree.
    pub fn without<F>(&self, pred: F) -> MarkupNode
    where
        F: Fn(&MarkupNode) -> bool + Copy,
    {
        MarkupNode {
            tag: self.tag.clone(),
            classes: self.classes.clone(),
            attributes: self.attributes.clone(),
            text: self.text.clone(),
            children: self
                .children
                .iter()
                .filter(|c| !pred(c))
                .map(|c| c.without(pred))
                .collect(),
        }
    }
}

/// Element selector helpers used with [`MarkupNode::find`] and friends.
pub fn tag(name: &'static str) -> impl Fn(&MarkupNode) -> bool + Copy {
    move |n: &MarkupNode| n.is(name)
}

pub fn tag_with_class(name: &'static str, class: &'static str) -> impl Fn(&MarkupNode) -> bool + Copy {
    move |n: &MarkupNode| n.is(name) && n.has_class(class)
}

/// Parse an HTML fragment (a page body) into its top-level nodes.
pub fn parse_fragment(html: &str) -> Vec<MarkupNode> {
    let fragment = Html::parse_fragment(html);
    let root = fragment.root_element();
    convert_children(&root)
}

fn convert_children(element: &ElementRef) -> Vec<MarkupNode> {
    element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(MarkupNode::text_node(text.to_string())),
            Node::Element(_) => ElementRef::wrap(child).map(|el| convert_element(&el)),
            _ => None,
        })
        .collect()
}

fn convert_element(element: &ElementRef) -> MarkupNode {
    let value = element.value();
    MarkupNode {
        tag: Some(value.name().to_ascii_lowercase()),
        classes: value.classes().map(str::to_string).collect(),
        attributes: value
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        children: convert_children(element),
        text: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_top_level_nodes_in_order() {
        let nodes = parse_fragment("<h1>Title</h1>text<p class=\"a b\">para</p>");
        assert_eq!(nodes.len(), 3);
        assert!(nodes[0].is("h1"));
        assert!(nodes[1].is_text());
        assert_eq!(nodes[1].text.as_deref(), Some("text"));
        assert!(nodes[2].is("p"));
        assert!(nodes[2].has_class("a"));
        assert!(nodes[2].has_class("b"));
    }

    #[test]
    fn keeps_attributes() {
        let nodes = parse_fragment(r#"<a href="/x?y=1" data-id="7">go</a>"#);
        assert_eq!(nodes[0].attr("href"), Some("/x?y=1"));
        assert_eq!(nodes[0].attr("data-id"), Some("7"));
        assert_eq!(nodes[0].attr("missing"), None);
    }

    #[test]
    fn drops_comments() {
        let nodes = parse_fragment("<!-- note --><p>x</p>");
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is("p"));
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let nodes = parse_fragment("<div>a<b>b</b><i>c<u>d</u></i></div>");
        assert_eq!(nodes[0].text_content(), "abcd");
    }

    #[test]
    fn find_all_and_find_outermost() {
        let nodes = parse_fragment("<section><div id=\"1\"><div id=\"2\"></div></div><div id=\"3\"></div></section>");
        let section = &nodes[0];
        let all = section.find_all(tag("div"));
        assert_eq!(all.len(), 3);
        let outer: Vec<_> = section
            .find_outermost(tag("div"))
            .iter()
            .map(|d| d.attr("id").unwrap_or_default().to_string())
            .collect();
        assert_eq!(outer, vec!["1", "3"]);
    }

    #[test]
    fn without_removes_matching_subtrees() {
        let nodes = parse_fragment("<p>keep <a href=\"x\">drop <b>me</b></a> this</p>");
        let stripped = nodes[0].without(tag("a"));
        assert_eq!(stripped.text_content(), "keep  this");
        assert_eq!(nodes[0].text_content(), "keep drop me this");
    }

    #[test]
    fn find_with_class() {
        let nodes = parse_fragment(
            "<div><span class=\"other\">no</span><span class=\"expand-control-text\">yes</span></div>",
        );
        let found = nodes[0].find(tag_with_class("span", "expand-control-text"));
        assert_eq!(found.map(|n| n.text_content()), Some("yes".to_string()));
    }
}
