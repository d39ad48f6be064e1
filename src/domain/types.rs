/// Core types and enums used throughout the domain layer
///
/// This module defines the identifier newtypes and the fixed color palette
/// that are shared by Habit, Action and the backup format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use crate::domain::DomainError;

/// Unique identifier for a habit
///
/// This is a wrapper around the database row id to provide type safety - you
/// can't accidentally pass a habit ID where an action ID is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HabitId(pub i64);

impl HabitId {
    /// Id carried by a habit that has not been inserted yet
    pub const UNSAVED: HabitId = HabitId(0);

    pub fn value(self) -> i64 {
        self.0
    }

    /// Whether the storage layer still has to assign a real id
    pub fn is_unsaved(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an action (one completion event)
///
/// Id `0` marks a phantom action: an empty day that was never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActionId(pub i64);

impl ActionId {
    pub const PHANTOM: ActionId = ActionId(0);

    pub fn value(self) -> i64 {
        self.0
    }

    pub fn is_phantom(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed palette a habit can be drawn with
///
/// Only the symbolic name matters to this crate: it is what gets written to
/// and read from `habits.csv`. Mapping to real UI colors is up to the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HabitColor {
    Blue,
    Green,
    Yellow,
    Red,
    Cyan,
    Pink,
}

impl HabitColor {
    /// Every color in palette order
    pub const ALL: [HabitColor; 6] = [
        HabitColor::Blue,
        HabitColor::Green,
        HabitColor::Yellow,
        HabitColor::Red,
        HabitColor::Cyan,
        HabitColor::Pink,
    ];

    /// Symbolic name used by the backup format
    pub fn name(&self) -> &'static str {
        match self {
            HabitColor::Blue => "Blue",
            HabitColor::Green => "Green",
            HabitColor::Yellow => "Yellow",
            HabitColor::Red => "Red",
            HabitColor::Cyan => "Cyan",
            HabitColor::Pink => "Pink",
        }
    }
}

impl Default for HabitColor {
    fn default() -> Self {
        HabitColor::Blue
    }
}

impl fmt::Display for HabitColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HabitColor {
    type Err = DomainError;

    /// Parse a color from its exact symbolic name (case sensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HabitColor::ALL
            .iter()
            .copied()
            .find(|color| color.name() == s)
            .ok_or_else(|| DomainError::InvalidColor(s.to_string()))
    }
}
