// Block renderer
// Walks a note line by line, dispatching each line to a block handler and
// collecting everything into a single styled buffer.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::inline;
use crate::style::{Attr, Color, StyledBuffer};

pub const QUOTE_BAR: &str = "▍ ";
pub const UNCHECKED_BOX: &str = "☐ ";
pub const CHECKED_BOX: &str = "☑ ";
pub const BULLET: &str = "• ";
pub const RULE_LINE: &str = "────────────";
pub const TABLE_DIVIDER: &str = "────────────────────────────────";
pub const TABLE_EDGE: &str = "│";
pub const TABLE_CELL_SEPARATOR: &str = " │ ";
pub const ELLIPSIS: &str = "...";

pub const FENCE: &str = "```";
pub const UNCHECKED_MARKER: &str = "- [ ]";
pub const CHECKED_MARKER: &str = "- [x]";

/// Heading sizes for whole-document rendering (H1, H2, H3)
const DOCUMENT_HEADING_SIZES: [f32; 3] = [1.5, 1.3, 1.1];
/// Heading sizes for single-line rendering, kept smaller to fit list rows
const LINE_HEADING_SIZES: [f32; 3] = [1.25, 1.15, 1.05];
const TABLE_TEXT_SIZE: f32 = 0.85;

static NUMBERED_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s").unwrap());
static NUMBERED_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\. (.*)$").unwrap());
static TABLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|[\s:\-|]+\|$").unwrap());

/// Colors and budgets for one render call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub base_text_color: Color,
    pub accent_color: Color,
    pub muted_text_color: Color,
    pub background_color: Color,
    /// Input lines beyond this count are ignored
    pub max_lines: usize,
    /// Output longer than this many characters is cut and ends in `...`
    pub truncate_length: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            base_text_color: Color(0xDCDDDEFF),
            accent_color: Color(0x7C3AEDFF),
            muted_text_color: Color(0x999999FF),
            background_color: Color(0x252525FF),
            max_lines: 2000,
            truncate_length: 50000,
        }
    }
}

/// Block-level meaning of a single line outside a code fence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind<'a> {
    Quote(&'a str),
    Heading { level: u8, text: &'a str },
    Checklist { checked: bool, text: &'a str },
    Bullet(&'a str),
    /// The whole line; number and text are captured when rendering
    Numbered(&'a str),
    Rule,
    TableSeparator,
    /// The trimmed line
    TableRow(&'a str),
    Blank,
    Paragraph(&'a str),
}

/// Classify a line. The first matching rule wins.
pub fn classify(line: &str) -> BlockKind<'_> {
    if let Some(rest) = line.strip_prefix("> ") {
        return BlockKind::Quote(rest);
    }
    if let Some((level, text)) = heading(line) {
        return BlockKind::Heading { level, text };
    }
    if let Some(rest) = line.strip_prefix(UNCHECKED_MARKER) {
        return BlockKind::Checklist {
            checked: false,
            text: rest.trim(),
        };
    }
    if let Some(rest) = line.strip_prefix(CHECKED_MARKER) {
        return BlockKind::Checklist {
            checked: true,
            text: rest.trim(),
        };
    }
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return BlockKind::Bullet(rest);
    }
    if NUMBERED_PREFIX.is_match(line) {
        return BlockKind::Numbered(line);
    }
    if line.starts_with("---") || line.starts_with("***") {
        return BlockKind::Rule;
    }
    let trimmed = line.trim();
    if trimmed.starts_with('|') {
        if TABLE_SEPARATOR.is_match(trimmed) {
            return BlockKind::TableSeparator;
        }
        return BlockKind::TableRow(trimmed);
    }
    if trimmed.is_empty() {
        return BlockKind::Blank;
    }
    BlockKind::Paragraph(line)
}

fn heading(line: &str) -> Option<(u8, &str)> {
    if let Some(text) = line.strip_prefix("# ") {
        Some((1, text))
    } else if let Some(text) = line.strip_prefix("## ") {
        Some((2, text))
    } else {
        line.strip_prefix("### ").map(|text| (3, text))
    }
}

fn heading_attrs(level: u8, sizes: &[f32; 3], options: &RenderOptions) -> Vec<Attr> {
    let index = usize::from(level.clamp(1, 3) - 1);
    let mut attrs = vec![Attr::Bold, Attr::RelativeSize(sizes[index])];
    if level == 1 {
        attrs.push(Attr::Foreground(options.accent_color));
    }
    attrs
}

/// Render a whole note body
pub fn render(content: &str, options: &RenderOptions) -> StyledBuffer {
    render_mapped(content, options).0
}

/// Render a note and report, for every input line that was processed, the
/// byte offset in the output where its rendering starts. Offsets never
/// decrease; lines that emit nothing share the next line's offset.
pub fn render_mapped(content: &str, options: &RenderOptions) -> (StyledBuffer, Vec<usize>) {
    let mut out = StyledBuffer::new();
    let mut line_starts = Vec::new();
    let mut in_fence = false;

    for line in content.lines().take(options.max_lines) {
        line_starts.push(out.len());
        if line.starts_with(FENCE) {
            in_fence = !in_fence;
            if !in_fence {
                out.push_str("\n");
            }
            continue;
        }

        if in_fence {
            let range = out.push_str(line);
            out.apply(
                range,
                &[Attr::Monospace, Attr::Foreground(options.muted_text_color)],
            );
            out.push_str("\n");
            continue;
        }

        render_block(&mut out, classify(line), options);
    }

    let length = out.char_count();
    if length > options.truncate_length {
        debug!(
            length,
            limit = options.truncate_length,
            "truncating rendered note"
        );
    }
    (out.truncate_chars(options.truncate_length, ELLIPSIS), line_starts)
}

fn render_block(out: &mut StyledBuffer, block: BlockKind<'_>, options: &RenderOptions) {
    match block {
        BlockKind::Quote(text) => {
            let start = out.push_str(QUOTE_BAR).start;
            let end = out.append(inline::format(text, options)).end;
            out.apply(
                start..end,
                &[Attr::Italic, Attr::Foreground(options.muted_text_color)],
            );
            out.push_str("\n");
        }
        BlockKind::Heading { level, text } => {
            let range = out.push_str(text);
            out.apply(range, &heading_attrs(level, &DOCUMENT_HEADING_SIZES, options));
            out.push_str("\n\n");
        }
        BlockKind::Checklist { checked, text } => {
            let glyph = if checked { CHECKED_BOX } else { UNCHECKED_BOX };
            let start = out.push_str(glyph).start;
            let end = out.append(inline::format(text, options)).end;
            if checked {
                out.apply(
                    start..end,
                    &[
                        Attr::Strikethrough,
                        Attr::Foreground(options.muted_text_color),
                    ],
                );
            }
            out.push_str("\n");
        }
        BlockKind::Bullet(text) => {
            out.push_str(BULLET);
            out.append(inline::format(text, options));
            out.push_str("\n");
        }
        BlockKind::Numbered(line) => {
            match NUMBERED_ITEM.captures(line) {
                Some(caps) => {
                    let number = caps.get(1).map_or("", |m| m.as_str());
                    let text = caps.get(2).map_or("", |m| m.as_str());
                    out.push_str(&format!("{}. ", number));
                    out.append(inline::format(text, options));
                }
                None => trace!(line, "numbered item without a plain space, content dropped"),
            }
            out.push_str("\n");
        }
        BlockKind::Rule => {
            out.push_str("\n");
            out.push_str(RULE_LINE);
            out.push_str("\n");
        }
        BlockKind::TableSeparator => {
            out.push_str(TABLE_DIVIDER);
            out.push_str("\n");
        }
        BlockKind::TableRow(row) => {
            let start = out.push_str(TABLE_EDGE).start;
            out.push_str(" ");
            for (i, cell) in table_cells(row).enumerate() {
                if i > 0 {
                    out.push_str(TABLE_CELL_SEPARATOR);
                }
                out.append(inline::format(cell, options));
            }
            out.push_str(" ");
            let end = out.push_str(TABLE_EDGE).end;
            out.apply(
                start..end,
                &[Attr::Monospace, Attr::RelativeSize(TABLE_TEXT_SIZE)],
            );
            out.push_str("\n");
        }
        BlockKind::Blank => {
            out.push_str("\n");
        }
        BlockKind::Paragraph(line) => {
            out.append(inline::format(line, options));
            out.push_str("\n");
        }
    }
}

/// Cells of a trimmed table row, without the bounding pipes
fn table_cells(row: &str) -> impl Iterator<Item = &str> {
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = row.strip_suffix('|').unwrap_or(row);
    row.split('|').map(str::trim)
}

/// Render exactly one line, without trailing block spacing.
///
/// Used for list row labels: headings get smaller size steps, everything
/// else is inline formatted as-is.
pub fn render_line(line: &str, options: &RenderOptions) -> StyledBuffer {
    match heading(line) {
        Some((level, text)) => {
            let mut out = StyledBuffer::plain(text);
            out.apply(0..text.len(), &heading_attrs(level, &LINE_HEADING_SIZES, options));
            out
        }
        None => inline::format(line, options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RenderOptions {
        RenderOptions::default()
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(classify("> quoted"), BlockKind::Quote("quoted"));
        assert_eq!(
            classify("## Two"),
            BlockKind::Heading {
                level: 2,
                text: "Two"
            }
        );
        assert_eq!(
            classify("- [x] done"),
            BlockKind::Checklist {
                checked: true,
                text: "done"
            }
        );
        assert_eq!(classify("* item"), BlockKind::Bullet("item"));
        assert_eq!(classify("12. twelve"), BlockKind::Numbered("12. twelve"));
        assert_eq!(classify("---"), BlockKind::Rule);
        assert_eq!(classify("  | a | b |  "), BlockKind::TableRow("| a | b |"));
        assert_eq!(classify("|:--|--:|"), BlockKind::TableSeparator);
        assert_eq!(classify("   "), BlockKind::Blank);
        assert_eq!(classify("#### deep"), BlockKind::Paragraph("#### deep"));
    }

    #[test]
    fn test_render_paragraph() {
        let buf = render("Hello **world**", &options());
        assert_eq!(buf.text(), "Hello world\n");
        assert!(buf.covers(6..11, &Attr::Bold));
    }

    #[test]
    fn test_render_headings() {
        let opts = options();
        let buf = render("# One\n## Two\n### Three", &opts);
        assert_eq!(buf.text(), "One\n\nTwo\n\nThree\n\n");

        assert!(buf.covers(0..3, &Attr::Bold));
        assert!(buf.covers(0..3, &Attr::RelativeSize(1.5)));
        assert!(buf.covers(0..3, &Attr::Foreground(opts.accent_color)));

        let two = buf.find("Two").unwrap();
        assert!(buf.covers(two.clone(), &Attr::RelativeSize(1.3)));
        assert!(!buf.covers(two, &Attr::Foreground(opts.accent_color)));

        let three = buf.find("Three").unwrap();
        assert!(buf.covers(three, &Attr::RelativeSize(1.1)));
    }

    #[test]
    fn test_render_quote() {
        let opts = options();
        let buf = render("> a *b*", &opts);
        assert_eq!(buf.text(), "▍ a b\n");
        let line = 0..buf.text().len() - 1;
        assert!(buf.covers(line.clone(), &Attr::Italic));
        assert!(buf.covers(line, &Attr::Foreground(opts.muted_text_color)));
    }

    #[test]
    fn test_render_checklists() {
        let opts = options();
        let buf = render("- [ ] open\n- [x] buy milk", &opts);
        assert_eq!(buf.text(), "☐ open\n☑ buy milk\n");

        let open = buf.find("open").unwrap();
        assert!(!buf.covers(open, &Attr::Strikethrough));

        let done = buf.find("☑ buy milk").unwrap();
        assert!(buf.covers(done.clone(), &Attr::Strikethrough));
        assert!(buf.covers(done, &Attr::Foreground(opts.muted_text_color)));
    }

    #[test]
    fn test_checklist_keeps_inline_styles() {
        let buf = render("- [ ] call **Bob**", &options());
        assert_eq!(buf.text(), "☐ call Bob\n");
        let bob = buf.find("Bob").unwrap();
        assert!(buf.covers(bob, &Attr::Bold));
    }

    #[test]
    fn test_render_bullets() {
        let buf = render("- one\n* two", &options());
        assert_eq!(buf.text(), "• one\n• two\n");
    }

    #[test]
    fn test_render_numbered() {
        let buf = render("1. first\n2. _second_", &options());
        assert_eq!(buf.text(), "1. first\n2. second\n");
        let second = buf.find("second").unwrap();
        assert!(buf.covers(second, &Attr::Italic));
    }

    #[test]
    fn test_numbered_line_without_space_is_dropped() {
        // Passes the prefix check (digits, dot, whitespace) but not the
        // capture, which wants a literal space. The line content vanishes.
        let buf = render("before\n3.\tthird\nafter", &options());
        assert_eq!(buf.text(), "before\n\nafter\n");
    }

    #[test]
    fn test_render_rule() {
        let buf = render("a\n---\nb", &options());
        assert_eq!(buf.text(), format!("a\n\n{}\nb\n", RULE_LINE));
    }

    #[test]
    fn test_render_table() {
        let buf = render("| a | b |\n|---|---|\n| **1** | 2 |", &options());
        let lines: Vec<&str> = buf.text().lines().collect();
        assert_eq!(lines, vec!["│ a │ b │", TABLE_DIVIDER, "│ 1 │ 2 │"]);

        let header = buf.find("│ a │ b │").unwrap();
        assert!(buf.covers(header.clone(), &Attr::Monospace));
        assert!(buf.covers(header, &Attr::RelativeSize(0.85)));

        let divider = buf.find(TABLE_DIVIDER).unwrap();
        assert!(buf.attrs_at(divider.start).is_empty());

        let last = buf.find("│ 1 │ 2 │").unwrap();
        assert!(buf.covers(last.clone(), &Attr::Monospace));
        let one = buf.text()[last.clone()].find('1').unwrap() + last.start;
        assert!(buf.covers(one..one + 1, &Attr::Bold));
    }

    #[test]
    fn test_table_columns_are_not_aligned() {
        let buf = render("| short | x |\n| a much longer cell | y |", &options());
        let lines: Vec<&str> = buf.text().lines().collect();
        assert_eq!(lines[0], "│ short │ x │");
        assert_eq!(lines[1], "│ a much longer cell │ y │");
    }

    #[test]
    fn test_render_code_fence() {
        let opts = options();
        let buf = render("```rust\nlet **x** = 1;\n```\nafter", &opts);
        assert_eq!(buf.text(), "let **x** = 1;\n\nafter\n");
        let code = 0.."let **x** = 1;".len();
        assert!(buf.covers(code.clone(), &Attr::Monospace));
        assert!(buf.covers(code, &Attr::Foreground(opts.muted_text_color)));
        assert!(!buf.runs().iter().any(|r| r.has(&Attr::Bold)));
    }

    #[test]
    fn test_unterminated_fence_runs_to_end() {
        let buf = render("```\n# not a heading\n- not a bullet", &options());
        assert_eq!(buf.text(), "# not a heading\n- not a bullet\n");
        let heading = buf.find("# not a heading").unwrap();
        let bullet = buf.find("- not a bullet").unwrap();
        assert!(buf.covers(heading, &Attr::Monospace));
        assert!(buf.covers(bullet, &Attr::Monospace));
        assert!(!buf.runs().iter().any(|r| r.has(&Attr::Bold)));
    }

    #[test]
    fn test_render_blank_lines() {
        let buf = render("a\n\n   \nb", &options());
        assert_eq!(buf.text(), "a\n\n\nb\n");
        assert!(buf.runs().is_empty());
    }

    #[test]
    fn test_empty_content() {
        assert!(render("", &options()).is_empty());
    }

    #[test]
    fn test_max_lines() {
        let content: String = (1..=3000).map(|i| format!("line{}\n", i)).collect();
        let opts = RenderOptions {
            max_lines: 2000,
            ..options()
        };
        let buf = render(&content, &opts);
        assert!(buf.text().contains("line2000\n"));
        assert!(!buf.text().contains("line2001"));
        assert_eq!(buf.text().lines().count(), 2000);
    }

    #[test]
    fn test_truncation() {
        let content = "x".repeat(100);
        let opts = RenderOptions {
            truncate_length: 20,
            ..options()
        };
        let buf = render(&content, &opts);
        assert_eq!(buf.char_count(), 20);
        assert!(buf.text().ends_with(ELLIPSIS));
        assert_eq!(buf.text(), format!("{}...", "x".repeat(17)));
    }

    #[test]
    fn test_truncation_never_exceeds_limit() {
        let content = "# Title\n- [x] **done**\n| a | b |\n```\ncode\n```\n> quote\n";
        for limit in 0..80 {
            let opts = RenderOptions {
                truncate_length: limit,
                ..options()
            };
            let buf = render(content, &opts);
            assert!(buf.char_count() <= limit, "limit {} gave {:?}", limit, buf.text());
            for run in buf.runs() {
                assert!(run.end <= buf.len());
            }
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let content = "# T\n**a** [[b|c]] ==d==\n- [ ] e";
        assert_eq!(render(content, &options()), render(content, &options()));
    }

    #[test]
    fn test_render_line_heading_sizes() {
        let opts = options();
        let buf = render_line("# Title", &opts);
        assert_eq!(buf.text(), "Title");
        assert!(buf.covers(0..5, &Attr::RelativeSize(1.25)));
        assert!(buf.covers(0..5, &Attr::Foreground(opts.accent_color)));

        let buf = render_line("## Sub", &opts);
        assert!(buf.covers(0..3, &Attr::RelativeSize(1.15)));

        let buf = render_line("### Small", &opts);
        assert!(buf.covers(0..5, &Attr::RelativeSize(1.05)));
    }

    #[test]
    fn test_render_line_inline() {
        let buf = render_line("buy **milk**", &options());
        assert_eq!(buf.text(), "buy milk");
        assert!(buf.covers(4..8, &Attr::Bold));
    }

    #[test]
    fn test_render_mapped_line_starts() {
        let (buf, starts) = render_mapped("# T\n```\ncode\n```\nend", &options());
        assert_eq!(buf.text(), "T\n\ncode\n\nend\n");
        assert_eq!(starts, vec![0, 3, 3, 8, 9]);

        let limited = RenderOptions {
            max_lines: 2,
            ..options()
        };
        let (_, starts) = render_mapped("a\nb\nc", &limited);
        assert_eq!(starts, vec![0, 2]);
    }
}
