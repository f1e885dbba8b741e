// Notes mirrored from the vault, and the per-widget deck holding them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::render::{CHECKED_MARKER, RenderOptions, UNCHECKED_MARKER, render};
use crate::segments::{DisplayRow, render_paragraphs, split_rows};
use crate::style::StyledBuffer;

/// Most notes a single widget can hold
pub const MAX_NOTES: usize = 20;
/// Note content is cut to this many characters when added to a deck
pub const MAX_CONTENT_LENGTH: usize = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Identifier used to deep-link back into the vault
    pub source_uri: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_modified: DateTime<Utc>,
}

impl Note {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        source_uri: impl Into<String>,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Note {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            source_uri: source_uri.into(),
            last_modified,
        }
    }

    pub fn render(&self, options: &RenderOptions) -> StyledBuffer {
        render(&self.content, options)
    }

    pub fn paragraphs(&self, options: &RenderOptions) -> Vec<DisplayRow> {
        render_paragraphs(&self.content, options)
    }

    pub fn rows(&self, options: &RenderOptions) -> Vec<DisplayRow> {
        split_rows(&self.content, options)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("maximum of {max} notes per widget exceeded")]
    CapacityExceeded { max: usize },
    #[error("no note with id '{0}'")]
    UnknownNote(String),
    #[error(transparent)]
    Toggle(#[from] ToggleError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToggleError {
    #[error("line {index} is out of range, the note has {count} lines")]
    LineOutOfRange { index: usize, count: usize },
    #[error("line {0} is not a checklist item")]
    NotACheckbox(usize),
}

/// Flip the checklist item on `line_index` between `- [ ]` and `- [x]`.
///
/// Line indices count the same way as `str::lines`. Everything except the
/// marker, including indentation and line endings, is left as it was.
pub fn toggle_checkbox(content: &str, line_index: usize) -> Result<String, ToggleError> {
    let mut out = String::with_capacity(content.len());
    let mut count = 0;

    for (index, line) in content.split_inclusive('\n').enumerate() {
        count += 1;
        if index != line_index {
            out.push_str(line);
            continue;
        }

        let indent = line.len() - line.trim_start().len();
        let (head, rest) = line.split_at(indent);
        let (marker, tail) = if let Some(tail) = rest.strip_prefix(UNCHECKED_MARKER) {
            (CHECKED_MARKER, tail)
        } else if let Some(tail) = rest.strip_prefix(CHECKED_MARKER) {
            (UNCHECKED_MARKER, tail)
        } else {
            return Err(ToggleError::NotACheckbox(line_index));
        };
        out.push_str(head);
        out.push_str(marker);
        out.push_str(tail);
    }

    if line_index >= count {
        return Err(ToggleError::LineOutOfRange {
            index: line_index,
            count,
        });
    }
    Ok(out)
}

/// The ordered notes shown by one widget
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteDeck {
    notes: Vec<Note>,
}

impl NoteDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a note at the end, cutting its content to `MAX_CONTENT_LENGTH`
    pub fn add(&mut self, mut note: Note) -> Result<(), DeckError> {
        if self.notes.len() >= MAX_NOTES {
            debug!(id = %note.id, "deck is full, rejecting note");
            return Err(DeckError::CapacityExceeded { max: MAX_NOTES });
        }
        if let Some((cut, _)) = note.content.char_indices().nth(MAX_CONTENT_LENGTH) {
            note.content.truncate(cut);
        }
        self.notes.push(note);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Note> {
        let index = self.notes.iter().position(|n| n.id == id)?;
        Some(self.notes.remove(index))
    }

    /// Move a note; out-of-range indices leave the deck unchanged
    pub fn reorder(&mut self, from: usize, to: usize) {
        if from >= self.notes.len() || to >= self.notes.len() {
            return;
        }
        let note = self.notes.remove(from);
        self.notes.insert(to, note);
    }

    pub fn get(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    pub fn find(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn update_content(
        &mut self,
        id: &str,
        content: impl Into<String>,
    ) -> Result<(), DeckError> {
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| DeckError::UnknownNote(id.to_string()))?;
        note.content = content.into();
        Ok(())
    }

    /// Toggle a checklist line of a stored note
    pub fn toggle_checkbox(&mut self, id: &str, line_index: usize) -> Result<(), DeckError> {
        let content = self
            .find(id)
            .ok_or_else(|| DeckError::UnknownNote(id.to_string()))?
            .content
            .as_str();
        let toggled = toggle_checkbox(content, line_index)?;
        self.update_content(id, toggled)
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn note(id: &str, content: &str) -> Note {
        Note::new(
            id,
            id.to_uppercase(),
            content,
            format!("{}.md", id),
            Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        )
    }

    #[test]
    fn test_toggle_unchecked() {
        let content = "# List\n- [ ] milk\n- [x] eggs\n";
        let toggled = toggle_checkbox(content, 1).unwrap();
        assert_eq!(toggled, "# List\n- [x] milk\n- [x] eggs\n");
    }

    #[test]
    fn test_toggle_checked_keeps_indent_and_crlf() {
        let content = "a\r\n   - [x] done\r\nb";
        let toggled = toggle_checkbox(content, 1).unwrap();
        assert_eq!(toggled, "a\r\n   - [ ] done\r\nb");
    }

    #[test]
    fn test_toggle_twice_restores() {
        let content = "- [ ] a\n- [ ] b";
        let once = toggle_checkbox(content, 1).unwrap();
        assert_eq!(toggle_checkbox(&once, 1).unwrap(), content);
    }

    #[test]
    fn test_toggle_errors() {
        let content = "text\n- [ ] a";
        assert_eq!(toggle_checkbox(content, 0), Err(ToggleError::NotACheckbox(0)));
        assert_eq!(
            toggle_checkbox(content, 5),
            Err(ToggleError::LineOutOfRange { index: 5, count: 2 })
        );
    }

    #[test]
    fn test_toggle_matches_row_indices() {
        let content = "intro\n\n- [ ] one\nmore\n- [x] two";
        let rows = split_rows(content, &RenderOptions::default());
        let indices: Vec<usize> = rows
            .iter()
            .filter_map(|row| match row {
                DisplayRow::Checkbox(c) => Some(c.line_index),
                DisplayRow::Text(_) => None,
            })
            .collect();
        assert_eq!(indices, vec![2, 4]);
        for index in indices {
            assert!(toggle_checkbox(content, index).is_ok());
        }
    }

    #[test]
    fn test_deck_capacity() {
        let mut deck = NoteDeck::new();
        for i in 0..MAX_NOTES {
            deck.add(note(&format!("n{}", i), "x")).unwrap();
        }
        assert_eq!(
            deck.add(note("extra", "x")),
            Err(DeckError::CapacityExceeded { max: MAX_NOTES })
        );
        assert_eq!(deck.len(), MAX_NOTES);
    }

    #[test]
    fn test_deck_caps_content() {
        let mut deck = NoteDeck::new();
        deck.add(note("long", &"é".repeat(3000))).unwrap();
        assert_eq!(deck.get(0).unwrap().content.chars().count(), MAX_CONTENT_LENGTH);
    }

    #[test]
    fn test_deck_remove_and_reorder() {
        let mut deck = NoteDeck::new();
        for id in ["a", "b", "c"] {
            deck.add(note(id, "")).unwrap();
        }
        deck.reorder(0, 2);
        let ids: Vec<&str> = deck.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        deck.reorder(0, 9);
        assert_eq!(deck.get(0).unwrap().id, "b");

        assert_eq!(deck.remove("c").map(|n| n.id), Some("c".to_string()));
        assert!(deck.remove("c").is_none());
        assert_eq!(deck.len(), 2);
        assert!(deck.find("a").is_some());

        deck.clear();
        assert!(deck.is_empty());
    }

    #[test]
    fn test_deck_toggle_checkbox() {
        let mut deck = NoteDeck::new();
        deck.add(note("todo", "- [ ] a\n- [ ] b")).unwrap();
        deck.toggle_checkbox("todo", 1).unwrap();
        assert_eq!(deck.find("todo").unwrap().content, "- [ ] a\n- [x] b");

        assert_eq!(
            deck.toggle_checkbox("missing", 0),
            Err(DeckError::UnknownNote("missing".to_string()))
        );
        assert_eq!(
            deck.toggle_checkbox("todo", 7),
            Err(DeckError::Toggle(ToggleError::LineOutOfRange { index: 7, count: 2 }))
        );
    }

    #[test]
    fn test_note_serializes_timestamp_as_millis() {
        let n = note("a", "body");
        let text = toml::to_string(&n).unwrap();
        assert!(text.contains("last_modified = 1700000000000"));
        let back: Note = toml::from_str(&text).unwrap();
        assert_eq!(back, n);
    }
}
