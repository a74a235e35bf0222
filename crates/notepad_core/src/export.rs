//! Standalone HTML export of a single note.
//!
//! # Responsibility
//! - Derive a filesystem-safe file name from a note title.
//! - Fill the export template with escaped title and sanitized content.
//!
//! # Invariants
//! - File names are never empty, contain no control or reserved path
//!   characters, and are at most [`MAX_FILE_NAME_CHARS`] characters.
//! - Exported content is re-sanitized even though stored content already is.

use crate::model::note::{format_timestamp, Note};
use crate::sanitize::sanitize_markup;
use crate::sanitize::tree::escape_text;
use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_FILE_NAME_CHARS: usize = 80;
const FALLBACK_FILE_NAME: &str = "untitled";
const GENERATOR: &str = "notepad";

static CONTROL_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x1F\x7F]").expect("valid control char regex"));
static RESERVED_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]+"#).expect("valid reserved char regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const EXPORT_STYLE: &str = r#"    html, body { background: #000000; color: #ffffff; }
    body { max-width: 720px; margin: 2rem auto; padding: 0 1rem; font: 16px/1.6 system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial, sans-serif; }
    .note-title { margin: 0 0 1rem 0; font-size: 1.75rem; line-height: 1.2; }
    .note-meta { color: #d3d3d3; font-size: .9rem; margin-bottom: 1.25rem; }
    .note-content :is(p, ul, ol, pre, blockquote) { margin: 1rem 0; }
    .note-content pre { background: #000000; padding: .75rem; border-radius: 6px; overflow: auto; }
    .note-content code { font-family: ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, "Liberation Mono", "Courier New", monospace; }
    .note-content blockquote { border-left: 4px solid #ddd; padding: .25rem .75rem; color: #555; }
    .note-footer { margin-top: 2rem; font-size: .85rem; color: #d3d3d3; }"#;

/// Rendered export ready to be written to disk or offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    /// File name including the `.html` extension.
    pub file_name: String,
    pub html: String,
}

/// Cleans a note title into a file name stem.
pub fn export_file_name(title: &str) -> String {
    let base = title.trim();
    let base = if base.is_empty() {
        FALLBACK_FILE_NAME
    } else {
        base
    };
    let without_controls = CONTROL_CHARS_RE.replace_all(base, " ");
    let without_reserved = RESERVED_CHARS_RE.replace_all(&without_controls, " ");
    let collapsed = WHITESPACE_RE.replace_all(&without_reserved, " ");
    let truncated: String = collapsed.trim().chars().take(MAX_FILE_NAME_CHARS).collect();
    let cleaned = truncated.trim_end();
    if cleaned.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Renders a note as a standalone styled HTML document.
pub fn render_document(note: &Note) -> ExportedDocument {
    let stem = export_file_name(&note.title);
    let content = sanitize_markup(&note.content);
    let html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>{page_title} - {GENERATOR}</title>\n<meta name=\"generator\" content=\"{GENERATOR}\">\n\
<style>\n{EXPORT_STYLE}\n  </style>\n</head>\n<body>\n\
<h1 class=\"note-title\">{heading}</h1>\n\
<p class=\"note-meta\">Last updated {updated}</p>\n\
<article class=\"note-content\">{content}</article>\n\
<footer class=\"note-footer\">Exported from {GENERATOR}</footer>\n</body>\n</html>\n",
        page_title = escape_text(&stem),
        heading = escape_text(&note.title),
        updated = format_timestamp(&note.updated_at),
    );

    ExportedDocument {
        file_name: format!("{stem}.html"),
        html,
    }
}
