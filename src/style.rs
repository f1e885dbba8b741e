// Styled text model
// A flat text buffer plus an arena of styled runs addressed by byte offsets.
// Every edit remaps the runs, so styles always refer to the current text.

use std::fmt;
use std::ops::Range;

/// An RGBA color stored as `0xRRGGBBAA`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 0xFF)
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    pub fn red(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn green(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn blue(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn alpha(self) -> u8 {
        self.0 as u8
    }

    /// Same color with the alpha channel replaced
    pub fn with_alpha(self, alpha: u8) -> Self {
        Color((self.0 & 0xFFFF_FF00) | alpha as u32)
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (the leading `#` is optional)
    pub fn parse_hex(value: &str) -> Option<Color> {
        let hex = value.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => u32::from_str_radix(hex, 16).ok().map(|rgb| Color((rgb << 8) | 0xFF)),
            8 => u32::from_str_radix(hex, 16).ok().map(Color),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08x}", self.0)
    }
}

/// A single visual attribute attached to a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attr {
    Bold,
    Italic,
    Strikethrough,
    Underline,
    Monospace,
    Foreground(Color),
    Background(Color),
    /// Font size relative to the surface's base size
    RelativeSize(f32),
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attr::Bold => write!(f, "bold"),
            Attr::Italic => write!(f, "italic"),
            Attr::Strikethrough => write!(f, "strike"),
            Attr::Underline => write!(f, "underline"),
            Attr::Monospace => write!(f, "mono"),
            Attr::Foreground(color) => write!(f, "fg({})", color),
            Attr::Background(color) => write!(f, "bg({})", color),
            Attr::RelativeSize(size) => write!(f, "size({})", size),
        }
    }
}

/// A styled range `[start, end)` of a buffer
#[derive(Debug, Clone, PartialEq)]
pub struct StyledRun {
    pub start: usize,
    pub end: usize,
    pub attrs: Vec<Attr>,
}

impl StyledRun {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn has(&self, attr: &Attr) -> bool {
        self.attrs.contains(attr)
    }
}

/// Text with styled runs layered on top of it.
///
/// Runs are additive: a run never replaces another one, so a character's
/// effective style is the union of all runs covering it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyledBuffer {
    text: String,
    runs: Vec<StyledRun>,
}

impl StyledBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        StyledBuffer {
            text: text.into(),
            runs: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn runs(&self) -> &[StyledRun] {
        &self.runs
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// True if the text holds nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Append unstyled text, returning the range it occupies
    pub fn push_str(&mut self, text: &str) -> Range<usize> {
        let start = self.text.len();
        self.text.push_str(text);
        start..self.text.len()
    }

    /// Append another buffer, keeping its runs
    pub fn append(&mut self, other: StyledBuffer) -> Range<usize> {
        let start = self.text.len();
        self.text.push_str(&other.text);
        self.runs.extend(other.runs.into_iter().map(|run| StyledRun {
            start: run.start + start,
            end: run.end + start,
            attrs: run.attrs,
        }));
        start..self.text.len()
    }

    /// Attach attributes to a range. Empty ranges and empty attribute lists
    /// are ignored; the range is clamped to the buffer.
    pub fn apply(&mut self, range: Range<usize>, attrs: &[Attr]) {
        let end = range.end.min(self.text.len());
        if range.start >= end || attrs.is_empty() {
            return;
        }
        self.runs.push(StyledRun {
            start: range.start,
            end,
            attrs: attrs.to_vec(),
        });
    }

    /// Replace `matched` with the sub-range `kept` of itself.
    ///
    /// Returns the new buffer and the range the kept text now occupies. Run
    /// endpoints before the match stay put, endpoints after it shift by the
    /// length difference, and endpoints inside it are mapped into the kept
    /// text (clamped to its bounds). Runs that collapse are dropped.
    pub fn splice(self, matched: Range<usize>, kept: Range<usize>) -> (Self, Range<usize>) {
        debug_assert!(matched.start <= kept.start && kept.end <= matched.end);
        let kept_len = kept.end - kept.start;

        let mut text = String::with_capacity(self.text.len());
        text.push_str(&self.text[..matched.start]);
        text.push_str(&self.text[kept.clone()]);
        text.push_str(&self.text[matched.end..]);

        let remap = |pos: usize| -> usize {
            if pos <= matched.start {
                pos
            } else if pos >= matched.end {
                pos - (matched.end - matched.start) + kept_len
            } else {
                matched.start + pos.saturating_sub(kept.start).min(kept_len)
            }
        };

        let runs = self
            .runs
            .into_iter()
            .map(|run| StyledRun {
                start: remap(run.start),
                end: remap(run.end),
                attrs: run.attrs,
            })
            .filter(|run| !run.is_empty())
            .collect();

        (StyledBuffer { text, runs }, matched.start..matched.start + kept_len)
    }

    /// Copy a byte range, clipping runs to it
    pub fn slice(&self, range: Range<usize>) -> StyledBuffer {
        let end = range.end.min(self.text.len());
        let start = range.start.min(end);
        let runs = self
            .runs
            .iter()
            .filter_map(|run| {
                let s = run.start.max(start);
                let e = run.end.min(end);
                (s < e).then(|| StyledRun {
                    start: s - start,
                    end: e - start,
                    attrs: run.attrs.clone(),
                })
            })
            .collect();
        StyledBuffer {
            text: self.text[start..end].to_string(),
            runs,
        }
    }

    /// Hard cut to at most `max_chars` characters, ending with `marker`.
    ///
    /// Buffers within the limit are returned untouched. The marker counts
    /// towards the limit and is left unstyled.
    pub fn truncate_chars(self, max_chars: usize, marker: &str) -> StyledBuffer {
        if self.text.chars().count() <= max_chars {
            return self;
        }
        let marker: String = marker.chars().take(max_chars).collect();
        let keep = max_chars - marker.chars().count();
        let cut = self
            .text
            .char_indices()
            .nth(keep)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len());
        let mut truncated = self.slice(0..cut);
        truncated.push_str(&marker);
        truncated
    }

    /// Strip leading and trailing newlines, keeping styles on what remains
    pub fn trim_newlines(self) -> StyledBuffer {
        let start = self.text.len() - self.text.trim_start_matches(['\n', '\r']).len();
        let end = self.text.trim_end_matches(['\n', '\r']).len().max(start);
        if start == 0 && end == self.text.len() {
            return self;
        }
        self.slice(start..end)
    }

    /// All attributes in effect at a byte offset, in application order
    pub fn attrs_at(&self, pos: usize) -> Vec<Attr> {
        self.runs
            .iter()
            .filter(|run| run.start <= pos && pos < run.end)
            .flat_map(|run| run.attrs.iter().copied())
            .collect()
    }

    /// True if every byte of `range` carries `attr`
    pub fn covers(&self, range: Range<usize>, attr: &Attr) -> bool {
        if range.start >= range.end {
            return false;
        }
        range.clone().all(|pos| {
            self.runs
                .iter()
                .any(|run| run.start <= pos && pos < run.end && run.has(attr))
        })
    }

    /// Byte range of the first occurrence of `needle`
    pub fn find(&self, needle: &str) -> Option<Range<usize>> {
        self.text.find(needle).map(|idx| idx..idx + needle.len())
    }

    /// Human readable dump of text and runs, one run per line
    pub fn describe(&self) -> String {
        let mut out = format!("{:?}", self.text);
        for run in &self.runs {
            let attrs: Vec<String> = run.attrs.iter().map(|a| a.to_string()).collect();
            out.push_str(&format!(
                "\n  {}..{} {:?} {}",
                run.start,
                run.end,
                &self.text[run.range()],
                attrs.join("+")
            ));
        }
        out
    }
}

impl fmt::Display for StyledBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
