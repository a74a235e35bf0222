//! Core domain logic for the notepad.
//! Owns the note collection, its persistence, and markup sanitization;
//! hosts supply storage, a clock and a rendering surface.

pub mod clock;
pub mod config;
pub mod db;
pub mod export;
pub mod format;
pub mod logging;
pub mod model;
pub mod repo;
pub mod sanitize;
pub mod search;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, StorageKeys, StoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use export::{export_file_name, render_document, ExportedDocument};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::note::{Note, NoteId};
pub use repo::kv_repo::{KvRepository, RepoError, RepoResult, SqliteKvRepository};
pub use repo::memory_repo::MemoryKvRepository;
pub use sanitize::{char_count, plain_text, sanitize_markup, word_count};
pub use search::keyword::{filter_notes, KeywordQuery};
pub use service::debounce::SaveStatus;
pub use service::editor_session::{EditorSession, NoteRow, Surface};
pub use service::note_store::{LoadOutcome, NoteStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
