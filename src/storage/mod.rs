/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. It provides
/// plain in-memory rows (habits, actions and pre-grouped counts) to the
/// analytics and backup code.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use chrono::NaiveDate;
use thiserror::Error;
use crate::analytics::{BucketCount, YearMonth, YearWeek};
use crate::domain::{Action, ActionId, Habit, HabitId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: HabitId },

    #[error("Action not found: {action_id}")]
    ActionNotFound { action_id: ActionId },

    #[error("Cannot store an action without a timestamp for habit {habit_id}")]
    PhantomAction { habit_id: HabitId },

    #[error("Invalid row in {table}: {message}")]
    InvalidRow { table: &'static str, message: String },

    #[error("No sort order left after {max_order}")]
    SortOrderExhausted { max_order: i64 },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Trait defining the storage interface for habits and actions
///
/// Grouped counts are computed by the storage layer. Callers only fill gaps
/// and assign buckets on top of them.
pub trait HabitStorage {
    /// All habits, archived ones included, in list order
    fn get_habits(&self) -> Result<Vec<Habit>, StorageError>;

    /// Get a habit by ID
    fn get_habit(&self, habit_id: HabitId) -> Result<Habit, StorageError>;

    /// Insert habits, returning their ids
    ///
    /// Unsaved habits get a fresh id. Habits with an `order` of zero are put
    /// at the end of the list.
    fn insert_habits(&self, habits: &[Habit]) -> Result<Vec<HabitId>, StorageError>;

    /// Update an existing habit
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Delete a habit together with all of its actions
    fn delete_habit(&self, habit_id: HabitId) -> Result<(), StorageError>;

    /// Every action of every habit, oldest first
    fn get_all_actions(&self) -> Result<Vec<Action>, StorageError>;

    /// Actions of one habit, oldest first
    fn get_actions_for_habit(&self, habit_id: HabitId) -> Result<Vec<Action>, StorageError>;

    /// Insert actions, returning their ids
    fn insert_actions(&self, actions: &[Action]) -> Result<Vec<ActionId>, StorageError>;

    fn delete_action(&self, action_id: ActionId) -> Result<(), StorageError>;

    /// Actions per local day, for one habit or across all non-archived habits
    fn count_actions_by_day(
        &self,
        habit_id: Option<HabitId>,
    ) -> Result<Vec<BucketCount<NaiveDate>>, StorageError>;

    /// Actions per ISO week, for one habit or across all non-archived habits
    fn count_actions_by_week(
        &self,
        habit_id: Option<HabitId>,
    ) -> Result<Vec<BucketCount<YearWeek>>, StorageError>;

    /// Actions per calendar month, for one habit or across all non-archived habits
    fn count_actions_by_month(
        &self,
        habit_id: Option<HabitId>,
    ) -> Result<Vec<BucketCount<YearMonth>>, StorageError>;

    /// Number of non-archived habits
    fn total_habit_count(&self) -> Result<u32, StorageError>;

    /// Replace every habit and action in one transaction
    fn restore_backup(&self, habits: &[Habit], actions: &[Action]) -> Result<(), StorageError>;
}
