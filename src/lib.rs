/// Public library interface for the habit statistics core
///
/// This module exports the tracker facade and the public types used by the
/// command line front end and by tests.

use std::io::{Read, Write};
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use thiserror::Error;

pub mod domain;
pub mod storage;
pub mod analytics;
pub mod backup;
pub mod preferences;

// Re-export public modules and types
pub use domain::*;
pub use storage::{HabitStorage, SqliteStorage, StorageError};
pub use analytics::{AnalyticsConfig, AnalyticsEngine, HabitOverview};
pub use backup::{BackupError, BackupSummary, BACKUP_VERSION};
pub use preferences::{PreferenceStore, Preferences};

/// Errors that can occur while driving the tracker
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Database error: {0}")]
    Database(#[from] StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),

    #[error("Backup error: {0}")]
    Backup(#[from] BackupError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Habit tracker backed by a SQLite database
///
/// Owns the storage and the analytics engine. Every query that depends on
/// the calendar takes `today` and a time zone from the caller.
pub struct HabitTracker {
    storage: SqliteStorage,
    analytics: AnalyticsEngine,
}

impl HabitTracker {
    /// Open (or create) the tracker database at `db_path`
    pub fn new(db_path: PathBuf, config: AnalyticsConfig) -> Result<Self, TrackerError> {
        tracing::info!("Opening habit tracker database: {:?}", db_path);

        let storage = SqliteStorage::new(db_path)?;
        Ok(Self::with_storage(storage, config))
    }

    pub fn with_storage(storage: SqliteStorage, config: AnalyticsConfig) -> Self {
        Self {
            storage,
            analytics: AnalyticsEngine::new(config),
        }
    }

    /// Create a habit at the end of the display order
    pub fn add_habit(&self, name: &str, color: HabitColor, notes: &str) -> Result<Habit, TrackerError> {
        let habit = Habit::new(name.to_string(), color, notes.to_string())?;
        let ids = self.storage.insert_habits(std::slice::from_ref(&habit))?;

        let id = ids.first().copied().unwrap_or(HabitId::UNSAVED);
        let saved = self.storage.get_habit(id)?;
        tracing::info!("Created habit {} '{}'", saved.id, saved.name);
        Ok(saved)
    }

    /// Record a completion of `habit_id` at `timestamp`
    pub fn log_action(&self, habit_id: HabitId, timestamp: DateTime<Utc>) -> Result<Action, TrackerError> {
        // Fails with HabitNotFound before anything is written
        self.storage.get_habit(habit_id)?;

        let mut action = Action::new(habit_id, timestamp);
        let ids = self.storage.insert_actions(std::slice::from_ref(&action))?;
        if let Some(id) = ids.first() {
            action.id = *id;
        }

        tracing::debug!("Logged action {} for habit {}", action.id, habit_id);
        Ok(action)
    }

    pub fn overviews<Tz: TimeZone>(&self, today: NaiveDate, tz: &Tz) -> Result<Vec<HabitOverview>, TrackerError> {
        Ok(self.analytics.habit_overviews(&self.storage, today, tz)?)
    }

    /// Write a full backup archive to `out`
    pub fn export<W: Write>(&self, out: &mut W) -> Result<BackupSummary, TrackerError> {
        Ok(backup::export_backup(&self.storage, out)?)
    }

    /// Replace all habits and actions with the backup read from `reader`
    pub fn import<R: Read>(&self, reader: &mut R) -> Result<BackupSummary, TrackerError> {
        Ok(backup::import_backup(&self.storage, reader)?)
    }

    pub fn preferences(&self) -> Preferences<'_, SqliteStorage> {
        Preferences::new(&self.storage)
    }

    /// Get a reference to the storage layer
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Get a reference to the analytics engine
    pub fn analytics(&self) -> &AnalyticsEngine {
        &self.analytics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> HabitTracker {
        let storage = SqliteStorage::open_in_memory().unwrap();
        HabitTracker::with_storage(storage, AnalyticsConfig::default())
    }

    #[test]
    fn test_add_habit_and_log() {
        let tracker = tracker();
        let habit = tracker.add_habit("  Meditate ", HabitColor::Cyan, "").unwrap();
        assert_eq!(habit.name, "Meditate");
        assert!(!habit.id.is_unsaved());

        let ts = Utc.with_ymd_and_hms(2021, 10, 16, 12, 0, 0).unwrap();
        let action = tracker.log_action(habit.id, ts).unwrap();
        assert!(!action.is_phantom());

        let today = NaiveDate::from_ymd_opt(2021, 10, 16).unwrap();
        let overviews = tracker.overviews(today, &Utc).unwrap();
        assert_eq!(overviews[0].history, ActionHistory::Streak(1));
    }

    #[test]
    fn test_invalid_name_rejected() {
        let tracker = tracker();
        let result = tracker.add_habit("   ", HabitColor::Red, "");
        assert!(matches!(result, Err(TrackerError::Domain(_))));
        assert!(tracker.storage().get_habits().unwrap().is_empty());
    }

    #[test]
    fn test_log_for_unknown_habit() {
        let tracker = tracker();
        let result = tracker.log_action(HabitId(42), Utc::now());
        assert!(matches!(
            result,
            Err(TrackerError::Database(StorageError::HabitNotFound { .. }))
        ));
    }

    #[test]
    fn test_export_then_import() {
        let source = tracker();
        let habit = source.add_habit("Walk", HabitColor::Green, "around, the block").unwrap();
        source
            .log_action(habit.id, Utc.with_ymd_and_hms(2021, 10, 1, 8, 30, 0).unwrap())
            .unwrap();

        let mut archive = Vec::new();
        let exported = source.export(&mut archive).unwrap();
        assert_eq!((exported.habits, exported.actions), (1, 1));

        let target = tracker();
        target.add_habit("Will be replaced", HabitColor::Blue, "").unwrap();
        let imported = target.import(&mut archive.as_slice()).unwrap();
        assert_eq!(imported, exported);

        assert_eq!(target.storage().get_habits().unwrap(), source.storage().get_habits().unwrap());
        assert_eq!(
            target.storage().get_all_actions().unwrap(),
            source.storage().get_all_actions().unwrap()
        );
    }

    #[test]
    fn test_preferences_persist_in_database() {
        let tracker = tracker();
        tracker
            .preferences()
            .set_dashboard_layout(preferences::DashboardLayout::Grid)
            .unwrap();
        assert_eq!(
            tracker.preferences().dashboard_layout().unwrap(),
            preferences::DashboardLayout::Grid
        );
    }
}
