// Terminal preview
// Converts styled buffers to crossterm styled content so notes can be
// checked without a widget host. Monospace and relative sizes have no
// terminal equivalent and are ignored.

use std::fmt::Write;

use crossterm::style::{Attribute, Color as TermColor, ContentStyle};

use crate::segments::DisplayRow;
use crate::style::{Attr, Color, StyledBuffer};

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.red(),
        g: color.green(),
        b: color.blue(),
    }
}

/// Terminal style for a set of attributes. Unstyled text gets the `base`
/// color; the last foreground in `attrs` wins.
pub fn content_style(attrs: &[Attr], base: Color) -> ContentStyle {
    let mut style = ContentStyle::new();
    style.foreground_color = Some(term_color(base));

    for attr in attrs {
        match attr {
            Attr::Bold => style.attributes.set(Attribute::Bold),
            Attr::Italic => style.attributes.set(Attribute::Italic),
            Attr::Underline => style.attributes.set(Attribute::Underlined),
            Attr::Strikethrough => style.attributes.set(Attribute::CrossedOut),
            Attr::Foreground(color) => style.foreground_color = Some(term_color(*color)),
            Attr::Background(color) => style.background_color = Some(term_color(*color)),
            Attr::Monospace | Attr::RelativeSize(_) => {}
        }
    }
    style
}

/// ANSI rendering of a buffer, one styled piece per stretch of text with
/// the same attributes
pub fn to_ansi(buffer: &StyledBuffer, base: Color) -> String {
    let text = buffer.text();
    let mut cuts = vec![0, text.len()];
    for run in buffer.runs() {
        cuts.push(run.start);
        cuts.push(run.end);
    }
    cuts.sort_unstable();
    cuts.dedup();

    let mut out = String::new();
    for window in cuts.windows(2) {
        let (start, end) = (window[0], window[1]);
        if start == end {
            continue;
        }
        let style = content_style(&buffer.attrs_at(start), base);
        // Keep escape sequences off line breaks so pagers do not smear them
        for (i, piece) in text[start..end].split('\n').enumerate() {
            if i > 0 {
                out.push('\n');
            }
            if !piece.is_empty() {
                let _ = write!(out, "{}", style.apply(piece));
            }
        }
    }
    out
}

/// Rows separated by blank lines, with a `[ ]`/`[x]` prefix and the source
/// line index for checkboxes
pub fn rows_to_ansi(rows: &[DisplayRow], base: Color) -> String {
    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        match row {
            DisplayRow::Text(text) => {
                out.push_str(&to_ansi(&text.content, base));
            }
            DisplayRow::Checkbox(checkbox) => {
                let mark = if checkbox.checked { "[x]" } else { "[ ]" };
                let _ = write!(out, "{} {}: ", mark, checkbox.line_index);
                out.push_str(&to_ansi(&checkbox.label, base));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderOptions;
    use crate::segments::split_rows;

    const BASE: Color = Color(0xDCDDDEFF);

    fn styled(attrs: &[Attr], text: &str) -> String {
        content_style(attrs, BASE).apply(text).to_string()
    }

    #[test]
    fn test_content_style_attributes() {
        let style = content_style(
            &[Attr::Bold, Attr::Strikethrough, Attr::Background(Color(0x102030FF))],
            BASE,
        );
        assert!(style.attributes.has(Attribute::Bold));
        assert!(style.attributes.has(Attribute::CrossedOut));
        assert!(!style.attributes.has(Attribute::Italic));
        assert_eq!(style.foreground_color, Some(TermColor::Rgb { r: 220, g: 221, b: 222 }));
        assert_eq!(style.background_color, Some(TermColor::Rgb { r: 16, g: 32, b: 48 }));
    }

    #[test]
    fn test_size_and_monospace_are_ignored() {
        let style = content_style(&[Attr::Monospace, Attr::RelativeSize(1.5)], BASE);
        assert_eq!(style, content_style(&[], BASE));
    }

    #[test]
    fn test_later_foreground_wins() {
        let style = content_style(
            &[Attr::Foreground(Color(0xFF0000FF)), Attr::Foreground(Color(0x00FF00FF))],
            BASE,
        );
        assert_eq!(style.foreground_color, Some(TermColor::Rgb { r: 0, g: 255, b: 0 }));
    }

    #[test]
    fn test_plain_text_uses_base_style() {
        let buf = StyledBuffer::plain("hi");
        assert_eq!(to_ansi(&buf, BASE), styled(&[], "hi"));
    }

    #[test]
    fn test_pieces_follow_runs() {
        let mut buf = StyledBuffer::plain("a b");
        buf.apply(2..3, &[Attr::Bold]);
        let expected = format!("{}{}", styled(&[], "a "), styled(&[Attr::Bold], "b"));
        assert_eq!(to_ansi(&buf, BASE), expected);
    }

    #[test]
    fn test_newlines_are_outside_escapes() {
        let buf = StyledBuffer::plain("a\n\nb");
        let expected = format!("{}\n\n{}", styled(&[], "a"), styled(&[], "b"));
        assert_eq!(to_ansi(&buf, BASE), expected);
    }

    #[test]
    fn test_rows_preview() {
        let rows = split_rows("intro\n- [x] done", &RenderOptions::default());
        let out = rows_to_ansi(&rows, BASE);
        assert!(out.contains("intro"));
        assert!(out.contains("[x] 1: "));
        assert!(out.contains("done"));
    }
}
