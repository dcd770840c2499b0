//! Table serializer: source `<table>` → fixed-width text grid.
//!
//! Notion has no importable table block, so tables become `plain text` code
//! blocks laid out the way prettytable prints them:
//!
//! ```text
//! +---+---+
//! | A | B |
//! +---+---+
//! | 1 | 2 |
//! | 3 | 4 |
//! +---+---+
//! ```
//!
//! Header cells are every `th` in document order; each `tr` with at least one
//! `td` is a body row. A table without `th` cells gets `Field 1..N` headers
//! sized by its first row. Rows of the wrong width make the table malformed,
//! and the dispatcher falls back to plain text.

use crate::pipeline::inline;
use crate::pipeline::markup::{tag, MarkupNode};
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

/// Why a table could not be laid out as a grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("table has no header and no data rows")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Lay out `table` as a text grid.
pub fn serialize(table: &MarkupNode) -> Result<String, TableError> {
    let header: Vec<String> = table
        .find_all(tag("th"))
        .into_iter()
        .map(|th| cell_text(th))
        .collect();

    let rows: Vec<Vec<String>> = table
        .find_all(tag("tr"))
        .into_iter()
        .map(|tr| tr.find_all(tag("td")).into_iter().map(|td| cell_text(td)).collect::<Vec<_>>())
        .filter(|row| !row.is_empty())
        .collect();

    let header = if header.is_empty() {
        let width = rows.first().map(Vec::len).ok_or(TableError::Empty)?;
        (1..=width).map(|i| format!("Field {}", i)).collect()
    } else {
        header
    };

    for (i, row) in rows.iter().enumerate() {
        if row.len() != header.len() {
            return Err(TableError::RowWidth {
                row: i + 1,
                expected: header.len(),
                found: row.len(),
            });
        }
    }

    Ok(render_grid(&header, &rows))
}

/// Cell text: one line per paragraph, blank lines dropped.
fn cell_text(cell: &MarkupNode) -> String {
    inline::plain(cell)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Terminal columns taken by `s`; CJK and most emoji take two.
fn width_of(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

fn render_grid(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header
        .iter()
        .map(|h| h.lines().map(width_of).max().unwrap_or(0))
        .collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let w = cell.lines().map(width_of).max().unwrap_or(0);
            widths[i] = widths[i].max(w);
        }
    }

    let border = {
        let mut s = String::from("+");
        for w in &widths {
            s.push_str(&"-".repeat(w + 2));
            s.push('+');
        }
        s
    };

    let mut lines = vec![border.clone()];
    lines.extend(render_row(header, &widths));
    lines.push(border.clone());
    for row in rows {
        lines.extend(render_row(row, &widths));
    }
    if !rows.is_empty() {
        lines.push(border);
    }
    lines.join("\n")
}

/// One grid row; multi-line cells make the row span several text lines.
fn render_row(cells: &[String], widths: &[usize]) -> Vec<String> {
    let cell_lines: Vec<Vec<&str>> = cells.iter().map(|c| c.lines().collect()).collect();
    let height = cell_lines.iter().map(Vec::len).max().unwrap_or(0).max(1);

    (0..height)
        .map(|line| {
            let mut s = String::from("|");
            for (i, w) in widths.iter().enumerate() {
                let text = cell_lines[i].get(line).copied().unwrap_or("");
                s.push(' ');
                s.push_str(&center(text, *w));
                s.push_str(" |");
            }
            s
        })
        .collect()
}

fn center(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(width_of(text));
    let left = pad / 2;
    let right = pad - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::markup::parse_fragment;

    fn table(html: &str) -> MarkupNode {
        parse_fragment(html).remove(0)
    }

    #[test]
    fn test_header_and_rows_in_order() {
        let t = table(
            "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr><tr><td>3</td><td>4</td></tr></table>",
        );
        let grid = serialize(&t).unwrap();
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(
            lines,
            vec![
                "+---+---+",
                "| A | B |",
                "+---+---+",
                "| 1 | 2 |",
                "| 3 | 4 |",
                "+---+---+",
            ]
        );
    }

    #[test]
    fn test_cell_less_row_is_skipped() {
        let t = table(
            "<table><tr><th>A</th></tr><tr></tr><tr><td>x</td></tr></table>",
        );
        let grid = serialize(&t).unwrap();
        assert_eq!(grid.lines().filter(|l| l.starts_with('|')).count(), 2);
    }

    #[test]
    fn test_no_header_uses_field_names() {
        let t = table("<table><tr><td>only</td><td>row</td></tr></table>");
        let grid = serialize(&t).unwrap();
        assert!(grid.contains("Field 1"));
        assert!(grid.contains("Field 2"));
        assert!(grid.contains("only"));
    }

    #[test]
    fn test_cells_are_centered_and_padded() {
        let t = table("<table><tr><th>Name</th></tr><tr><td>x</td></tr></table>");
        let grid = serialize(&t).unwrap();
        assert!(grid.contains("| Name |"));
        assert!(grid.contains("|  x   |"));
    }

    #[test]
    fn test_ragged_row_is_malformed() {
        let t = table(
            "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td></tr></table>",
        );
        assert_eq!(
            serialize(&t),
            Err(TableError::RowWidth {
                row: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_empty_table_is_malformed() {
        let t = table("<table></table>");
        assert_eq!(serialize(&t), Err(TableError::Empty));
    }

    #[test]
    fn test_wide_characters_keep_grid_aligned() {
        let t = table("<table><tr><th>名前</th><th>B</th></tr><tr><td>ab</td><td>x</td></tr></table>");
        let grid = serialize(&t).unwrap();
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(
            lines,
            vec![
                "+------+---+",
                "| 名前 | B |",
                "+------+---+",
                "|  ab  | x |",
                "+------+---+",
            ]
        );
        let widths: Vec<usize> = lines.iter().map(|l| width_of(l)).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "misaligned: {widths:?}");
    }

    #[test]
    fn test_multiline_cell() {
        let t = table("<table><tr><th>A</th></tr><tr><td><p>one</p><p>two</p></td></tr></table>");
        let grid = serialize(&t).unwrap();
        assert!(grid.contains("| one |"));
        assert!(grid.contains("| two |"));
    }
}
