//! Formatted inline text: the payload carried by every block title.
//!
//! A [`FormattedText`] is an ordered run of [`Span`]s, each with its own
//! [`Marks`] (bold, italic, strikethrough, inline code, link). The Notion
//! client maps spans one-to-one onto rich-text objects; `Display` renders the
//! same spans as Markdown, which is what logs and tests look at.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inline formatting applied to a [`Span`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub code: bool,
    /// Hyperlink target, exactly as it appeared in the source `href`.
    pub link: Option<String>,
}

/// A contiguous piece of text sharing one set of [`Marks`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub marks: Marks,
}

/// Ordered spans of formatted text. Adjacent spans with identical marks are
/// always merged, so two texts that render the same compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedText {
    spans: Vec<Span>,
}

impl FormattedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unformatted text.
    pub fn plain(text: impl Into<String>) -> Self {
        let mut t = Self::new();
        t.push(text, &Marks::default());
        t
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Append `text` with `marks`, merging into the previous span when the
    /// marks match.
    pub fn push(&mut self, text: impl Into<String>, marks: &Marks) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.marks == *marks => last.text.push_str(&text),
            _ => self.spans.push(Span {
                text,
                marks: marks.clone(),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }

    /// `true` when the text contains nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.spans.iter().all(|s| s.text.trim().is_empty())
    }

    /// The text with all formatting removed.
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn ends_with_newline(&self) -> bool {
        self.spans
            .last()
            .map(|s| s.text.ends_with('\n'))
            .unwrap_or(false)
    }

    /// `true` when the text ends with whitespace (or is empty), i.e. a
    /// following collapsed space would be redundant.
    pub fn ends_with_whitespace(&self) -> bool {
        self.spans
            .last()
            .and_then(|s| s.text.chars().last())
            .map(char::is_whitespace)
            .unwrap_or(true)
    }

    /// Number of consecutive `\n` at the very end of the text.
    pub fn trailing_newlines(&self) -> usize {
        let mut count = 0;
        for span in self.spans.iter().rev() {
            for ch in span.text.chars().rev() {
                if ch == '\n' {
                    count += 1;
                } else {
                    return count;
                }
            }
        }
        count
    }

    /// Remove leading and trailing whitespace, dropping spans that become
    /// empty.
    pub fn trim(mut self) -> Self {
        while let Some(first) = self.spans.first_mut() {
            let trimmed = first.text.trim_start().to_string();
            if trimmed.is_empty() {
                self.spans.remove(0);
            } else {
                first.text = trimmed;
                break;
            }
        }
        while let Some(last) = self.spans.last_mut() {
            let trimmed = last.text.trim_end().to_string();
            if trimmed.is_empty() {
                self.spans.pop();
            } else {
                last.text = trimmed;
                break;
            }
        }
        self
    }

    /// Split on `\n`, keeping marks. Every segment is trimmed; blank lines
    /// come back as empty texts so callers can apply their own policy.
    pub fn split_lines(&self) -> Vec<FormattedText> {
        let mut lines = vec![FormattedText::new()];
        for span in &self.spans {
            let mut parts = span.text.split('\n');
            if let Some(first) = parts.next() {
                if let Some(current) = lines.last_mut() {
                    current.push(first, &span.marks);
                }
            }
            for part in parts {
                let mut next = FormattedText::new();
                next.push(part, &span.marks);
                lines.push(next);
            }
        }
        lines.into_iter().map(FormattedText::trim).collect()
    }
}

impl From<&str> for FormattedText {
    fn from(s: &str) -> Self {
        FormattedText::plain(s)
    }
}

impl From<String> for FormattedText {
    fn from(s: String) -> Self {
        FormattedText::plain(s)
    }
}

impl fmt::Display for FormattedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for span in &self.spans {
            let m = &span.marks;
            let mut out = span.text.clone();
            if m.code {
                out = format!("`{}`", out);
            }
            if m.strikethrough {
                out = format!("~~{}~~", out);
            }
            if m.italic {
                out = format!("_{}_", out);
            }
            if m.bold {
                out = format!("**{}**", out);
            }
            if let Some(ref href) = m.link {
                out = format!("[{}]({})", out, href);
            }
            f.write_str(&out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold() -> Marks {
        Marks {
            bold: true,
            ..Marks::default()
        }
    }

    #[test]
    fn adjacent_spans_with_same_marks_merge() {
        let mut t = FormattedText::new();
        t.push("foo", &Marks::default());
        t.push("bar", &Marks::default());
        t.push("baz", &bold());
        assert_eq!(t.spans().len(), 2);
        assert_eq!(t.to_string(), "foobar**baz**");
    }

    #[test]
    fn markdown_rendering_nests_marks() {
        let mut t = FormattedText::new();
        t.push(
            "docs",
            &Marks {
                bold: true,
                italic: true,
                link: Some("https://example.com".into()),
                ..Marks::default()
            },
        );
        assert_eq!(t.to_string(), "[**_docs_**](https://example.com)");
    }

    #[test]
    fn trim_drops_whitespace_only_edge_spans() {
        let mut t = FormattedText::new();
        t.push("  \n", &Marks::default());
        t.push(" hi ", &bold());
        t.push("\n ", &Marks::default());
        let t = t.trim();
        assert_eq!(t.to_string(), "**hi**");
    }

    #[test]
    fn split_lines_keeps_marks_per_segment() {
        let mut t = FormattedText::new();
        t.push("one\ntw", &Marks::default());
        t.push("o", &bold());
        t.push("\n\nthree", &Marks::default());
        let lines: Vec<String> = t.split_lines().iter().map(|l| l.to_string()).collect();
        assert_eq!(lines, vec!["one", "tw**o**", "", "three"]);
    }

    #[test]
    fn trailing_newlines_counts_across_spans() {
        let mut t = FormattedText::new();
        t.push("a\n", &Marks::default());
        t.push("\n", &bold());
        assert_eq!(t.trailing_newlines(), 2);
        assert!(t.ends_with_newline());
        assert_eq!(FormattedText::plain("x").trailing_newlines(), 0);
    }

    #[test]
    fn blank_detection() {
        assert!(FormattedText::new().is_blank());
        assert!(FormattedText::plain(" \n ").is_blank());
        assert!(!FormattedText::plain("x").is_blank());
    }
}
