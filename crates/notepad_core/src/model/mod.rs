//! Domain model for the notepad.
//!
//! # Responsibility
//! - Define the persisted note record and its normalization helpers.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Content held by a note is sanitized markup.

pub mod note;
