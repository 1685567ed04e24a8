//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate form validation and repository calls into use-case APIs.
//! - Keep CLI and other front ends decoupled from storage details.

pub mod todo_service;
