//! Case-insensitive keyword filter.
//!
//! # Responsibility
//! - Match a keyword against note titles and plain-text content.
//!
//! # Invariants
//! - Keywords are trimmed; a blank keyword matches every note.
//! - Output preserves input order.

use crate::model::note::Note;
use crate::sanitize::plain_text;

/// Normalized keyword ready for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordQuery {
    needle: String,
}

impl KeywordQuery {
    pub fn new(raw: &str) -> Self {
        Self {
            needle: raw.trim().to_lowercase(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.needle
    }

    /// Returns whether title or plain-text content contains the keyword.
    pub fn matches(&self, note: &Note) -> bool {
        if self.is_blank() {
            return true;
        }
        note.title.to_lowercase().contains(&self.needle)
            || plain_text(&note.content)
                .to_lowercase()
                .contains(&self.needle)
    }
}

/// Filters notes by keyword, keeping input order.
pub fn filter_notes<'a, I>(notes: I, raw_keyword: &str) -> Vec<&'a Note>
where
    I: IntoIterator<Item = &'a Note>,
{
    let query = KeywordQuery::new(raw_keyword);
    notes
        .into_iter()
        .filter(|note| query.matches(note))
        .collect()
}
