//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate storage, sanitization and selection into note use-cases.
//! - Keep UI layers decoupled from storage details behind `Surface`.

pub mod debounce;
pub mod editor_session;
pub mod note_store;
