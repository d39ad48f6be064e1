/// Action entity for tracking habit completions
///
/// This module defines the Action struct that represents a single completion
/// event of a habit, plus the helpers that turn its instant into a calendar day.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use crate::domain::{ActionId, HabitId};

/// A record of completing a habit at a specific instant
///
/// A phantom action (id `0`, no timestamp) stands for a day on which the habit
/// was not done. Phantoms are only produced by the recent activity window and
/// are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Unique identifier, `0` until persisted
    pub id: ActionId,
    /// Which habit this action belongs to
    pub habit_id: HabitId,
    /// When the habit was completed
    pub timestamp: Option<DateTime<Utc>>,
}

impl Action {
    /// Create a new, not yet persisted completion event
    pub fn new(habit_id: HabitId, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: ActionId::PHANTOM,
            habit_id,
            timestamp: Some(timestamp),
        }
    }

    /// Create an empty placeholder for a day without a completion
    pub fn phantom(habit_id: HabitId) -> Self {
        Self {
            id: ActionId::PHANTOM,
            habit_id,
            timestamp: None,
        }
    }

    /// Create an action from existing data (used when loading from database or a backup)
    pub fn from_existing(
        id: ActionId,
        habit_id: HabitId,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            habit_id,
            timestamp,
        }
    }

    pub fn is_phantom(&self) -> bool {
        self.timestamp.is_none()
    }

    /// Calendar day of this action in the given time zone
    pub fn local_date<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDate> {
        self.timestamp
            .as_ref()
            .map(|ts| ts.with_timezone(tz).date_naive())
    }

    /// Timestamp as epoch milliseconds, the precision used by storage and backups
    pub fn timestamp_millis(&self) -> Option<i64> {
        self.timestamp.map(|ts| ts.timestamp_millis())
    }
}
