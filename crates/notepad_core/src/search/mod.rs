//! Note filtering entry points.
//!
//! # Responsibility
//! - Match notes against a free-text keyword for the visible list.
//!
//! # Invariants
//! - Filtering is pure: it never reorders or mutates the input.

pub mod keyword;
