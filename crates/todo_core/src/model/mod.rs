//! Domain model for the todo tracker.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Host the pure overdue predicate.
//!
//! # Invariants
//! - Every persisted record is identified by a store-assigned `TodoId`.
//! - Deletion is a hard delete; no tombstones are kept.

pub mod todo;
