//! Note domain model.
//!
//! # Responsibility
//! - Define the single persisted record of the notepad.
//! - Own timestamp formatting and lenient decoding of stored records.
//!
//! # Invariants
//! - `id` is assigned once and never rewritten for a live note.
//! - `updated_at >= created_at` after every mutation helper.
//! - Timestamps serialize as ISO 8601 UTC with millisecond precision.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Opaque note identifier.
///
/// Kept as a string because stored collections may carry ids produced by
/// older generators.
pub type NoteId = String;

/// Title used whenever a title is blank.
pub const UNTITLED: &str = "Untitled";
/// Suffix appended to the title of a duplicated note.
pub const COPY_SUFFIX: &str = " (copy)";

/// User-authored document with rich-text content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Sanitized markup. Never raw editor output.
    pub content: String,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
    /// Reserved for future extension; carried through untouched.
    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl Note {
    /// Creates a note with a fresh id and both timestamps set to `now`.
    pub fn new(title: &str, content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: new_note_id(),
            title: normalize_title(title),
            content: content.into(),
            created_at: now,
            updated_at: now,
            meta: Map::new(),
        }
    }

    /// Refreshes `updated_at`, never moving it before `created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    /// Builds a note from one stored JSON object, filling gaps.
    ///
    /// Missing ids are regenerated, blank titles become [`UNTITLED`],
    /// missing or unparseable timestamps fall back to `now`. Content is
    /// returned as stored; callers re-sanitize it.
    pub fn from_stored(record: &Map<String, Value>, now: DateTime<Utc>) -> Self {
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(new_note_id);
        let title = record
            .get("title")
            .and_then(Value::as_str)
            .map(normalize_title)
            .unwrap_or_else(|| UNTITLED.to_string());
        let content = record
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let created_at = stored_timestamp(record, "createdAt").unwrap_or(now);
        let updated_at = stored_timestamp(record, "updatedAt")
            .unwrap_or(now)
            .max(created_at);
        let meta = match record.get("meta") {
            Some(Value::Object(meta)) => meta.clone(),
            _ => Map::new(),
        };

        Self {
            id,
            title,
            content,
            created_at,
            updated_at,
            meta,
        }
    }
}

/// Generates a collection-unique identifier.
pub fn new_note_id() -> NoteId {
    Uuid::new_v4().to_string()
}

/// Trims a title and substitutes [`UNTITLED`] when nothing is left.
pub fn normalize_title(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Formats a timestamp the way it is persisted, e.g. `2024-05-01T10:00:00.000Z`.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses any RFC 3339 timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|value| value.with_timezone(&Utc))
}

fn stored_timestamp(record: &Map<String, Value>, field: &str) -> Option<DateTime<Utc>> {
    record
        .get(field)
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
}

mod iso_millis {
    use super::{format_timestamp, parse_timestamp};
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
    }
}
