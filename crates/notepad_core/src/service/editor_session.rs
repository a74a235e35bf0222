//! Editor session wiring between the note store and a rendering surface.
//!
//! # Responsibility
//! - Translate UI events (list click, buttons, title/editor input, filter
//!   input, timer tick) into note store operations.
//! - Push the resulting state back to the surface: list rows, editor
//!   markup, title, word count, save status, action availability.
//!
//! # Invariants
//! - Every list render is sorted newest first and filtered by the current
//!   filter text.
//! - The editor surface only ever receives sanitized markup.
//! - Deletion asks the surface for confirmation unless bypassed.

use crate::clock::Clock;
use crate::format::{count_label, relative_stamp};
use crate::model::note::{Note, NoteId};
use crate::repo::kv_repo::KvRepository;
use crate::sanitize::{char_count, word_count, EMPTY_PARAGRAPH};
use crate::service::debounce::SaveStatus;
use crate::service::note_store::NoteStore;

/// One selectable row of the note list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRow {
    pub id: NoteId,
    pub title: String,
    /// Relative last-modified stamp, e.g. "5 minutes ago".
    pub updated_label: String,
    /// Plain-text length, e.g. "42 chars".
    pub length_label: String,
    pub is_active: bool,
}

/// Rendering surface driven by the session.
///
/// Implemented by concrete UIs; the core never touches a UI toolkit.
pub trait Surface {
    /// Raw markup currently in the editing area.
    fn editor_markup(&self) -> String;
    fn set_editor_markup(&mut self, markup: &str);
    fn set_title_input(&mut self, title: &str);
    /// Replaces the list. An empty slice means the empty-state box shows.
    fn render_list(&mut self, rows: &[NoteRow]);
    /// Duplicate/delete buttons follow the selection.
    fn set_actions_enabled(&mut self, enabled: bool);
    fn set_word_count(&mut self, label: &str);
    fn set_save_status(&mut self, status: SaveStatus);
    /// Interactive confirmation before deleting `note`.
    fn confirm_delete(&mut self, note: &Note) -> bool;
}

pub struct EditorSession<R: KvRepository, C: Clock, U: Surface> {
    store: NoteStore<R, C>,
    surface: U,
    filter_text: String,
}

impl<R: KvRepository, C: Clock, U: Surface> EditorSession<R, C, U> {
    /// Starts a session, loading the store first when it is still empty.
    pub fn start(mut store: NoteStore<R, C>, surface: U) -> Self {
        if store.notes().is_empty() {
            store.load();
        }
        if store.active_id().is_none() {
            store.restore_selection();
        }

        let mut session = Self {
            store,
            surface,
            filter_text: String::new(),
        };
        session.draw();
        session.show_active();
        session.push_status();
        session
    }

    /// List click.
    pub fn on_select(&mut self, id: &str) -> bool {
        if !self.store.select(id) {
            return false;
        }
        self.refresh();
        true
    }

    pub fn on_new(&mut self) -> NoteId {
        let id = self.store.create(None, None);
        self.refresh();
        id
    }

    pub fn on_duplicate(&mut self) -> Option<NoteId> {
        let id = self.store.duplicate()?;
        self.refresh();
        Some(id)
    }

    /// Deletes the active note after confirmation.
    ///
    /// `bypass_confirm` mirrors the modifier-key shortcut.
    pub fn on_delete(&mut self, bypass_confirm: bool) -> Option<Note> {
        let note = self.store.current()?;
        if !bypass_confirm && !self.surface.confirm_delete(&note) {
            return None;
        }
        let removed = self.store.delete();
        self.refresh();
        removed
    }

    pub fn on_title_input(&mut self, text: &str) {
        if self.store.update_title(text) {
            self.draw();
            self.push_status();
        }
    }

    /// Reads the editor, sanitizes into the store and echoes the cleaned
    /// markup back when sanitization changed it.
    pub fn on_editor_input(&mut self) {
        let raw = self.surface.editor_markup();
        let Some(clean) = self.store.update_content(&raw) else {
            return;
        };
        if clean != raw {
            self.surface.set_editor_markup(&clean);
        }
        self.surface
            .set_word_count(&count_label(word_count(&clean), "word"));
        self.draw();
        self.push_status();
    }

    pub fn on_filter_input(&mut self, keyword: &str) {
        self.filter_text = keyword.to_string();
        self.draw();
    }

    /// Host timer callback. Returns whether a debounced save fired.
    pub fn on_tick(&mut self) -> bool {
        if !self.store.tick() {
            return false;
        }
        self.push_status();
        true
    }

    /// Writes any pending save now (page hide, shutdown).
    pub fn flush(&mut self) -> SaveStatus {
        let status = self.store.flush();
        self.push_status();
        status
    }

    /// Rows for the current filter, newest first.
    pub fn rows(&self) -> Vec<NoteRow> {
        let now = self.store.clock().now();
        let active_id = self.store.active_id();
        self.store
            .filter(&self.filter_text)
            .into_iter()
            .map(|note| NoteRow {
                id: note.id.clone(),
                title: note.title.clone(),
                updated_label: relative_stamp(note.updated_at, now),
                length_label: count_label(char_count(&note.content), "char"),
                is_active: active_id == Some(note.id.as_str()),
            })
            .collect()
    }

    pub fn can_modify(&self) -> bool {
        self.store.active_id().is_some()
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn store(&self) -> &NoteStore<R, C> {
        &self.store
    }

    pub fn surface(&self) -> &U {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut U {
        &mut self.surface
    }

    pub fn into_parts(self) -> (NoteStore<R, C>, U) {
        (self.store, self.surface)
    }

    fn refresh(&mut self) {
        self.draw();
        self.show_active();
        self.push_status();
    }

    fn draw(&mut self) {
        let rows = self.rows();
        self.surface.render_list(&rows);
        let enabled = self.can_modify();
        self.surface.set_actions_enabled(enabled);
    }

    fn show_active(&mut self) {
        let Some(note) = self.store.current() else {
            return;
        };
        let markup = if note.content.is_empty() {
            EMPTY_PARAGRAPH
        } else {
            note.content.as_str()
        };
        self.surface.set_title_input(&note.title);
        self.surface.set_editor_markup(markup);
        self.surface
            .set_word_count(&count_label(word_count(markup), "word"));
    }

    fn push_status(&mut self) {
        let status = self.store.save_status();
        self.surface.set_save_status(status);
    }
}
