//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the record store contract used by services.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `TodoDraft::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod todo_repo;
