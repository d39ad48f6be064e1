/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents something the
/// user wants to do regularly, along with its validation rules.

use serde::{Deserialize, Serialize};
use crate::domain::{DomainError, HabitColor, HabitId};

/// A habit the user marks as done day by day
///
/// Habits are ordered for display by `order`. Archived habits keep their
/// history but drop out of the dashboard, the heatmap and the top lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Palette color used when drawing the habit
    pub color: HabitColor,
    /// Position in the habit list
    pub order: i32,
    /// Whether the habit has been archived by the user
    pub archived: bool,
    /// Free-text notes
    pub notes: String,
}

impl Habit {
    /// Create a new, not yet persisted habit with validation
    ///
    /// The storage layer assigns the id and, for an `order` of zero,
    /// the next free position.
    pub fn new(
        name: String,
        color: HabitColor,
        notes: String,
    ) -> Result<Self, DomainError> {
        let name = name.trim().to_string();
        Self::validate_name(&name)?;

        Ok(Self {
            id: HabitId::UNSAVED,
            name,
            color,
            order: 0,
            archived: false,
            notes,
        })
    }

    /// Create a habit from existing data (used when loading from database or a backup)
    ///
    /// This constructor assumes data is already validated.
    pub fn from_existing(
        id: HabitId,
        name: String,
        color: HabitColor,
        order: i32,
        archived: bool,
        notes: String,
    ) -> Self {
        Self {
            id,
            name,
            color,
            order,
            archived,
            notes,
        }
    }

    /// Update the habit's editable properties with validation
    pub fn update(
        &mut self,
        name: Option<String>,
        color: Option<HabitColor>,
        notes: Option<String>,
        archived: Option<bool>,
    ) -> Result<(), DomainError> {
        let name = name.map(|n| n.trim().to_string());
        if let Some(ref new_name) = name {
            Self::validate_name(new_name)?;
        }

        if let Some(new_name) = name {
            self.name = new_name;
        }
        if let Some(new_color) = color {
            self.color = new_color;
        }
        if let Some(new_notes) = notes {
            self.notes = new_notes;
        }
        if let Some(new_archived) = archived {
            self.archived = new_archived;
        }

        Ok(())
    }

    pub fn has_notes(&self) -> bool {
        !self.notes.trim().is_empty()
    }

    /// Validate habit name according to business rules
    fn validate_name(name: &str) -> Result<(), DomainError> {
        if name.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if name.chars().count() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(())
    }
}
