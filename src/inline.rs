// Inline formatting
// Applies a fixed sequence of pattern passes to one line of text. Each pass
// is a pure function from buffer to buffer; later passes see the output of
// earlier ones, so `**[[Page]]**` ends up bold and linked.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::render::RenderOptions;
use crate::style::{Attr, StyledBuffer};

/// Alpha applied to the accent color for `==highlight==` backgrounds (~25%)
pub const HIGHLIGHT_ALPHA: u8 = 0x40;

static BOLD_STARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static BOLD_UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"__(.+?)__").unwrap());
static ITALIC_STAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static ITALIC_UNDERSCORE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_(.+?)_").unwrap());
static STRIKETHROUGH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~~(.+?)~~").unwrap());
static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`(.+?)`").unwrap());
static WIKILINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[(.+?)\]\]").unwrap());
static EXTERNAL_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.+?)\]\((.+?)\)").unwrap());
static HIGHLIGHT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"==(.+?)==").unwrap());

/// One inline substitution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineRule {
    Bold,
    BoldUnderscore,
    Italic,
    ItalicUnderscore,
    Strikethrough,
    Code,
    Wikilink,
    ExternalLink,
    Highlight,
}

/// The passes in the order they run
pub const INLINE_RULES: [InlineRule; 9] = [
    InlineRule::Bold,
    InlineRule::BoldUnderscore,
    InlineRule::Italic,
    InlineRule::ItalicUnderscore,
    InlineRule::Strikethrough,
    InlineRule::Code,
    InlineRule::Wikilink,
    InlineRule::ExternalLink,
    InlineRule::Highlight,
];

impl InlineRule {
    fn pattern(self) -> &'static Regex {
        match self {
            InlineRule::Bold => &BOLD_STARS,
            InlineRule::BoldUnderscore => &BOLD_UNDERSCORES,
            InlineRule::Italic => &ITALIC_STAR,
            InlineRule::ItalicUnderscore => &ITALIC_UNDERSCORE,
            InlineRule::Strikethrough => &STRIKETHROUGH,
            InlineRule::Code => &CODE,
            InlineRule::Wikilink => &WIKILINK,
            InlineRule::ExternalLink => &EXTERNAL_LINK,
            InlineRule::Highlight => &HIGHLIGHT,
        }
    }

    fn attrs(self, options: &RenderOptions) -> Vec<Attr> {
        match self {
            InlineRule::Bold | InlineRule::BoldUnderscore => vec![Attr::Bold],
            InlineRule::Italic | InlineRule::ItalicUnderscore => vec![Attr::Italic],
            InlineRule::Strikethrough => vec![Attr::Strikethrough],
            InlineRule::Code => vec![
                Attr::Monospace,
                Attr::Background(options.background_color),
                Attr::Foreground(options.accent_color),
            ],
            InlineRule::Wikilink | InlineRule::ExternalLink => {
                vec![Attr::Foreground(options.accent_color), Attr::Underline]
            }
            InlineRule::Highlight => {
                vec![Attr::Background(options.accent_color.with_alpha(HIGHLIGHT_ALPHA))]
            }
        }
    }

    /// The part of a match that stays visible
    fn visible_range(self, caps: &Captures<'_>) -> Option<Range<usize>> {
        let inner = caps.get(1)?;
        if self != InlineRule::Wikilink {
            return Some(inner.range());
        }

        // [[target|alias]] shows the alias, [[target]] (or an empty alias)
        // shows the target
        match inner.as_str().find('|') {
            Some(bar) if bar + 1 < inner.len() => Some(inner.start() + bar + 1..inner.end()),
            Some(bar) => Some(inner.start()..inner.start() + bar),
            None => Some(inner.range()),
        }
    }
}

/// Format one line of markdown into styled text
pub fn format(line: &str, options: &RenderOptions) -> StyledBuffer {
    format_buffer(StyledBuffer::plain(line), options)
}

/// Run every inline pass over an existing buffer
pub fn format_buffer(buffer: StyledBuffer, options: &RenderOptions) -> StyledBuffer {
    INLINE_RULES
        .iter()
        .fold(buffer, |buffer, rule| apply_rule(buffer, *rule, options))
}

/// Apply a single pass: replace every non-overlapping match left to right,
/// styling exactly the replaced text. Scanning resumes after each
/// replacement, so substituted text is never matched twice by the same pass.
pub fn apply_rule(
    mut buffer: StyledBuffer,
    rule: InlineRule,
    options: &RenderOptions,
) -> StyledBuffer {
    let attrs = rule.attrs(options);
    let mut offset = 0;

    while offset <= buffer.len() {
        let Some((matched, kept)) = rule
            .pattern()
            .captures_at(buffer.text(), offset)
            .and_then(|caps| Some((caps.get(0)?.range(), rule.visible_range(&caps)?)))
        else {
            break;
        };

        let (next, replaced) = buffer.splice(matched, kept);
        buffer = next;
        buffer.apply(replaced.clone(), &attrs);
        offset = replaced.end;
    }

    buffer
}
