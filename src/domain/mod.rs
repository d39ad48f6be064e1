/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, Action) and the streak
/// classification derived from them, together with their validation rules.

pub mod habit;
pub mod action;
pub mod history;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use action::*;
pub use history::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}
