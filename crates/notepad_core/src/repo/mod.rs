//! Persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the key-value storage contract used by the note store.
//! - Isolate SQLite details from service orchestration.
//!
//! # Invariants
//! - Repository APIs never panic; every failure is a `RepoError`.
//! - Keys are validated before any storage access.

pub mod kv_repo;
pub mod memory_repo;
