//! Input forms.
//!
//! # Responsibility
//! - Validate raw user input before it reaches the record store.
//! - Carry presentation hints for a rendering layer, separate from the model.

pub mod todo_form;
