// Segment splitting
// Cuts a note into rows that a virtualized list can show and click
// independently: paragraph chunks, or prose rows interleaved with
// interactive checkbox rows.

use std::ops::Range;

use tracing::trace;

use crate::links::{Link, extract_links};
use crate::render::{
    CHECKED_MARKER, RenderOptions, UNCHECKED_MARKER, render, render_line, render_mapped,
};
use crate::style::StyledBuffer;

/// A block of rendered prose
#[derive(Debug, Clone, PartialEq)]
pub struct TextRow {
    pub content: StyledBuffer,
    /// The raw markdown the row was rendered from
    pub source: String,
    /// Zero-based index of the first source line
    pub first_line: usize,
}

/// A single checklist item
#[derive(Debug, Clone, PartialEq)]
pub struct CheckboxRow {
    pub label: StyledBuffer,
    pub checked: bool,
    pub original_line: String,
    /// Zero-based line index in the note, used to address toggles
    pub line_index: usize,
}

/// One clickable unit handed to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayRow {
    Text(TextRow),
    Checkbox(CheckboxRow),
}

/// What a click on part of a row asks the note store to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    OpenNote {
        note_id: String,
    },
    ToggleCheckbox {
        note_id: String,
        line_index: usize,
        checked: bool,
    },
}

impl DisplayRow {
    /// The styled text shown for this row (the label for checkboxes)
    pub fn content(&self) -> &StyledBuffer {
        match self {
            DisplayRow::Text(row) => &row.content,
            DisplayRow::Checkbox(row) => &row.label,
        }
    }

    pub fn visible_text(&self) -> &str {
        self.content().text()
    }

    pub fn is_checkbox(&self) -> bool {
        matches!(self, DisplayRow::Checkbox(_))
    }

    /// Raw markdown behind the row
    pub fn source(&self) -> &str {
        match self {
            DisplayRow::Text(row) => &row.source,
            DisplayRow::Checkbox(row) => &row.original_line,
        }
    }

    /// Links in the row's source, including the URLs hidden by rendering
    pub fn links(&self) -> Vec<Link> {
        extract_links(self.source())
    }

    /// Clicking the text of any row opens the note
    pub fn label_action(&self, note_id: &str) -> RowAction {
        RowAction::OpenNote {
            note_id: note_id.to_string(),
        }
    }

    /// Clicking a checkbox indicator toggles it; text rows have no indicator
    pub fn indicator_action(&self, note_id: &str) -> Option<RowAction> {
        match self {
            DisplayRow::Text(_) => None,
            DisplayRow::Checkbox(row) => Some(RowAction::ToggleCheckbox {
                note_id: note_id.to_string(),
                line_index: row.line_index,
                checked: row.checked,
            }),
        }
    }
}

/// Offsets of non-overlapping `\n\n` pairs, scanning left to right
pub fn paragraph_boundaries(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut boundaries = Vec::new();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'\n' && bytes[i + 1] == b'\n' {
            boundaries.push(i);
            i += 2;
        } else {
            i += 1;
        }
    }
    boundaries
}

/// Byte ranges between paragraph boundaries, boundaries excluded
fn paragraph_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for boundary in paragraph_boundaries(text) {
        ranges.push(start..boundary);
        start = boundary + 2;
    }
    ranges.push(start..text.len());
    ranges
}

/// Non-blank paragraph ranges with surrounding newlines stripped
fn paragraph_spans(text: &str) -> Vec<Range<usize>> {
    paragraph_ranges(text)
        .into_iter()
        .filter(|range| !text[range.clone()].trim().is_empty())
        .map(|range| {
            let piece = &text[range.clone()];
            let start = range.start + (piece.len() - piece.trim_start_matches(['\n', '\r']).len());
            let end = range.start + piece.trim_end_matches(['\n', '\r']).len();
            start..end.max(start)
        })
        .collect()
}

/// Index of the source line whose rendering covers output offset `pos`
fn line_at(line_starts: &[usize], pos: usize) -> usize {
    line_starts
        .partition_point(|&start| start <= pos)
        .saturating_sub(1)
}

/// Split a rendered buffer into paragraph segments.
///
/// Segments keep their styles, lose surrounding newlines, and are dropped
/// when they hold only whitespace. A buffer without boundaries is one
/// segment; a blank buffer has none.
pub fn split_paragraphs(buffer: &StyledBuffer) -> Vec<StyledBuffer> {
    paragraph_spans(buffer.text())
        .into_iter()
        .map(|span| buffer.slice(span))
        .collect()
}

/// Render a note and split it into paragraph rows.
///
/// Each row carries the raw lines it was rendered from, so clicks route the
/// same way as in row-split mode.
pub fn render_paragraphs(content: &str, options: &RenderOptions) -> Vec<DisplayRow> {
    let (buffer, line_starts) = render_mapped(content, options);
    let lines: Vec<&str> = content.lines().collect();

    paragraph_spans(buffer.text())
        .into_iter()
        .map(|span| {
            let first_line = line_at(&line_starts, span.start);
            let last_line = line_at(&line_starts, span.end.saturating_sub(1)).max(first_line);
            DisplayRow::Text(TextRow {
                source: lines[first_line..=last_line].join("\n"),
                content: buffer.slice(span),
                first_line,
            })
        })
        .collect()
}

/// Checked state and item text if `line` is a checklist item
pub fn checklist_item(line: &str) -> Option<(bool, &str)> {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed.strip_prefix(UNCHECKED_MARKER) {
        Some((false, rest.trim()))
    } else {
        trimmed
            .strip_prefix(CHECKED_MARKER)
            .map(|rest| (true, rest.trim()))
    }
}

/// Split a note into text and checkbox rows.
///
/// Works on raw lines so every checkbox keeps the index of the line it came
/// from. Prose between checkboxes is rendered as one text row per run of
/// lines.
pub fn split_rows(content: &str, options: &RenderOptions) -> Vec<DisplayRow> {
    let mut rows = Vec::new();
    let mut pending = PendingText::default();

    for (index, line) in content.lines().take(options.max_lines).enumerate() {
        match checklist_item(line) {
            Some((checked, text)) => {
                pending.flush_into(&mut rows, options);
                rows.push(DisplayRow::Checkbox(CheckboxRow {
                    label: render_line(text, options),
                    checked,
                    original_line: line.to_string(),
                    line_index: index,
                }));
            }
            None => pending.push(index, line),
        }
    }
    pending.flush_into(&mut rows, options);

    rows
}

#[derive(Default)]
struct PendingText<'a> {
    lines: Vec<&'a str>,
    first_line: usize,
}

impl<'a> PendingText<'a> {
    fn push(&mut self, index: usize, line: &'a str) {
        if self.lines.is_empty() {
            self.first_line = index;
        }
        self.lines.push(line);
    }

    fn flush_into(&mut self, rows: &mut Vec<DisplayRow>, options: &RenderOptions) {
        if self.lines.is_empty() {
            return;
        }
        let source = self.lines.join("\n");
        self.lines.clear();

        let content = render(&source, options).trim_newlines();
        if content.is_blank() {
            trace!(first_line = self.first_line, "skipping blank text row");
            return;
        }
        rows.push(DisplayRow::Text(TextRow {
            content,
            source,
            first_line: self.first_line,
        }));
    }
}
