//! Note store controller.
//!
//! # Responsibility
//! - Own the note collection and the active selection.
//! - Restore the collection from key-value storage and persist it back
//!   through a trailing-edge debounce.
//! - Provide create/duplicate/delete/select/edit/filter use-cases.
//!
//! # Invariants
//! - The collection is never empty after `load()`.
//! - Note ids are pairwise distinct.
//! - Stored content is always sanitizer output.
//! - The collection is kept sorted by `updated_at` descending (stable).
//! - Storage failures never roll back in-memory state; they only flip the
//!   save status to `Failed`.

use crate::clock::Clock;
use crate::config::StoreConfig;
use crate::model::note::{new_note_id, normalize_title, Note, NoteId, COPY_SUFFIX};
use crate::repo::kv_repo::KvRepository;
use crate::sanitize::{sanitize_markup, EMPTY_PARAGRAPH};
use crate::search::keyword::filter_notes;
use crate::service::debounce::{Debouncer, SaveStatus};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::collections::HashSet;

/// How `load()` obtained the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Stored notes were decoded.
    Restored { count: usize },
    /// Nothing usable was stored; a default note was created.
    Initialized,
    /// Stored data was unreadable; a default note replaced it.
    Recovered,
}

/// Single source of truth for notes, selection and persistence.
pub struct NoteStore<R: KvRepository, C: Clock> {
    repo: R,
    clock: C,
    config: StoreConfig,
    notes: Vec<Note>,
    active_id: Option<NoteId>,
    pending_write: Debouncer,
    save_status: SaveStatus,
}

impl<R: KvRepository, C: Clock> NoteStore<R, C> {
    /// Creates an empty, unloaded store. Call [`NoteStore::load`] before use.
    pub fn new(repo: R, clock: C, config: StoreConfig) -> Self {
        let pending_write = Debouncer::new(config.save_debounce());
        Self {
            repo,
            clock,
            config,
            notes: Vec::new(),
            active_id: None,
            pending_write,
            save_status: SaveStatus::Saved,
        }
    }

    /// Creates a store, loads the collection and restores the selection.
    pub fn open(repo: R, clock: C, config: StoreConfig) -> Self {
        let mut store = Self::new(repo, clock, config);
        store.load();
        store.restore_selection();
        store
    }

    /// Reads the stored collection, falling back to one default note.
    ///
    /// Never fails: absent, empty or malformed data is replaced, and the
    /// replacement is scheduled for saving so the default note keeps its id
    /// across reopens.
    pub fn load(&mut self) -> LoadOutcome {
        let now = self.clock.now();
        let raw = match self.repo.get(&self.config.storage_keys.notes) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("event=store_load module=store status=error error_code=read_failed error={err}");
                None
            }
        };

        let outcome = match raw.as_deref().map(|raw| decode_collection(raw, now)) {
            None => {
                self.notes = vec![self.default_note(now)];
                LoadOutcome::Initialized
            }
            Some(Ok(notes)) if notes.is_empty() => {
                self.notes = vec![self.default_note(now)];
                LoadOutcome::Initialized
            }
            Some(Ok(notes)) => {
                let count = notes.len();
                self.notes = notes;
                LoadOutcome::Restored { count }
            }
            Some(Err(err)) => {
                warn!("event=store_load module=store status=recovered error_code=decode_failed error={err}");
                self.notes = vec![self.default_note(now)];
                LoadOutcome::Recovered
            }
        };

        self.sort_notes();
        if !self.active_id.as_deref().is_some_and(|id| self.contains(id)) {
            self.active_id = None;
        }
        if !matches!(outcome, LoadOutcome::Restored { .. }) {
            self.schedule_persist();
        }
        info!(
            "event=store_load module=store status=ok outcome={outcome:?} notes={}",
            self.notes.len()
        );
        outcome
    }

    /// Selects the persisted last-selected note, or the head note when the
    /// stored id is absent or stale.
    pub fn restore_selection(&mut self) -> Option<NoteId> {
        let stored = match self.repo.get(&self.config.storage_keys.last_selected) {
            Ok(stored) => stored,
            Err(err) => {
                warn!("event=selection_restore module=store status=error error={err}");
                None
            }
        };
        let target = stored
            .filter(|id| self.contains(id))
            .or_else(|| self.notes.first().map(|note| note.id.clone()))?;
        self.select(&target);
        Some(target)
    }

    /// Inserts a new note at the head, selects it and schedules a save.
    pub fn create(&mut self, title: Option<&str>, content: Option<&str>) -> NoteId {
        let now = self.clock.now();
        let title = title.unwrap_or(self.config.new_note_title.as_str());
        let content = sanitize_markup(content.unwrap_or(EMPTY_PARAGRAPH));
        let note = Note::new(title, content, now);
        let id = note.id.clone();
        self.insert_head(note);
        debug!("event=note_create module=store status=ok note_id={id}");
        id
    }

    /// Copies the active note under a `" (copy)"` title. No-op without a
    /// selection.
    pub fn duplicate(&mut self) -> Option<NoteId> {
        let source = self.active_note()?;
        let title = format!("{}{COPY_SUFFIX}", source.title);
        let content = source.content.clone();
        let source_id = source.id.clone();

        let note = Note::new(&title, content, self.clock.now());
        let id = note.id.clone();
        self.insert_head(note);
        debug!("event=note_duplicate module=store status=ok source_id={source_id} note_id={id}");
        Some(id)
    }

    /// Removes the active note and selects the new head.
    ///
    /// Deleting the last note synthesizes a blank replacement. No-op without
    /// a selection. Confirmation is the caller's responsibility.
    pub fn delete(&mut self) -> Option<Note> {
        let active_id = self.active_id.clone()?;
        let position = self.notes.iter().position(|note| note.id == active_id)?;
        let removed = self.notes.remove(position);

        if self.notes.is_empty() {
            let now = self.clock.now();
            let replacement = self.default_note(now);
            self.notes.push(replacement);
        }
        self.sort_notes();

        let fallback = self.notes[0].id.clone();
        self.select(&fallback);
        self.schedule_persist();
        debug!(
            "event=note_delete module=store status=ok note_id={} selected={fallback} remaining={}",
            removed.id,
            self.notes.len()
        );
        Some(removed)
    }

    /// Makes `id` the active note and writes it through immediately.
    ///
    /// Unknown ids are ignored and keep the current selection.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            debug!("event=note_select module=store status=skipped reason=unknown_id");
            return false;
        }
        self.active_id = Some(id.to_string());
        self.write_selection();
        true
    }

    /// Replaces the active note title. Blank titles become `Untitled`.
    pub fn update_title(&mut self, text: &str) -> bool {
        let now = self.clock.now();
        let Some(note) = self.active_note_mut() else {
            return false;
        };
        note.title = normalize_title(text);
        note.touch(now);
        self.sort_notes();
        self.schedule_persist();
        true
    }

    /// Sanitizes and stores markup on the active note.
    ///
    /// Returns the sanitized markup so the editing surface can be refreshed.
    pub fn update_content(&mut self, markup: &str) -> Option<String> {
        let now = self.clock.now();
        let clean = sanitize_markup(markup);
        let note = self.active_note_mut()?;
        note.content = clean.clone();
        note.touch(now);
        self.sort_notes();
        self.schedule_persist();
        Some(clean)
    }

    /// Visible notes for a keyword: newest first, then filtered.
    pub fn filter(&self, keyword: &str) -> Vec<&Note> {
        let mut ordered: Vec<&Note> = self.notes.iter().collect();
        ordered.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        filter_notes(ordered, keyword)
    }

    /// Snapshot of the active note.
    pub fn current(&self) -> Option<Note> {
        self.active_note().cloned()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn save_status(&self) -> SaveStatus {
        self.save_status
    }

    /// Deadline of the pending debounced write, if any.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.pending_write.deadline()
    }

    /// Fires the debounced write when its quiet interval has elapsed.
    pub fn tick(&mut self) -> bool {
        if !self.pending_write.fire_if_due(self.clock.now()) {
            return false;
        }
        self.write_notes();
        true
    }

    /// Writes a pending save immediately.
    pub fn flush(&mut self) -> SaveStatus {
        if self.pending_write.cancel() {
            self.write_notes();
        }
        self.save_status
    }

    /// Writes the collection now, dropping any pending debounce.
    pub fn save_now(&mut self) -> SaveStatus {
        self.pending_write.cancel();
        self.write_notes();
        self.save_status
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn repo_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    pub fn into_repo(self) -> R {
        self.repo
    }

    fn contains(&self, id: &str) -> bool {
        self.notes.iter().any(|note| note.id == id)
    }

    fn active_note(&self) -> Option<&Note> {
        let active_id = self.active_id.as_deref()?;
        self.notes.iter().find(|note| note.id == active_id)
    }

    fn active_note_mut(&mut self) -> Option<&mut Note> {
        let active_id = self.active_id.as_deref()?;
        self.notes.iter_mut().find(|note| note.id == active_id)
    }

    fn default_note(&self, now: DateTime<Utc>) -> Note {
        Note::new(&self.config.new_note_title, EMPTY_PARAGRAPH, now)
    }

    fn insert_head(&mut self, note: Note) {
        let id = note.id.clone();
        self.notes.insert(0, note);
        self.sort_notes();
        self.select(&id);
        self.schedule_persist();
    }

    fn sort_notes(&mut self) {
        self.notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    }

    fn schedule_persist(&mut self) {
        let due_at = self.pending_write.schedule(self.clock.now());
        self.save_status = SaveStatus::Pending;
        debug!(
            "event=save_schedule module=store status=pending due_at_ms={}",
            due_at.timestamp_millis()
        );
    }

    fn write_notes(&mut self) {
        let payload = match serde_json::to_string(&self.notes) {
            Ok(payload) => payload,
            Err(err) => {
                self.save_status = SaveStatus::Failed;
                error!("event=save_notes module=store status=error error_code=encode_failed error={err}");
                return;
            }
        };

        match self.repo.set(&self.config.storage_keys.notes, &payload) {
            Ok(()) => {
                self.save_status = SaveStatus::Saved;
                debug!(
                    "event=save_notes module=store status=ok notes={} bytes={}",
                    self.notes.len(),
                    payload.len()
                );
            }
            Err(err) => {
                self.save_status = SaveStatus::Failed;
                error!("event=save_notes module=store status=error error_code=write_failed error={err}");
            }
        }
    }

    fn write_selection(&mut self) {
        let Some(active_id) = self.active_id.as_deref() else {
            return;
        };
        if let Err(err) = self
            .repo
            .set(&self.config.storage_keys.last_selected, active_id)
        {
            self.save_status = SaveStatus::Failed;
            error!("event=save_selection module=store status=error error_code=write_failed error={err}");
        }
    }
}

/// Decodes a stored collection, normalizing every record.
///
/// Non-object entries are skipped. Duplicate ids are re-keyed, content is
/// re-sanitized and `updated_at` is clamped to `created_at`.
fn decode_collection(raw: &str, now: DateTime<Utc>) -> Result<Vec<Note>, serde_json::Error> {
    let records: Vec<Value> = serde_json::from_str(raw)?;
    let mut seen = HashSet::new();
    let mut notes = Vec::with_capacity(records.len());

    for record in &records {
        let Value::Object(record) = record else {
            continue;
        };
        let mut note = Note::from_stored(record, now);
        while !seen.insert(note.id.clone()) {
            note.id = new_note_id();
        }
        note.content = sanitize_markup(&note.content);
        notes.push(note);
    }

    if notes.len() != records.len() {
        warn!(
            "event=store_load module=store status=degraded skipped_records={}",
            records.len() - notes.len()
        );
    }
    Ok(notes)
}
