/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habit data. It handles all SQL queries and data conversion.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::analytics::{BucketCount, CalendarBucket, YearMonth, YearWeek};
use crate::domain::{Action, ActionId, Habit, HabitColor, HabitId};
use crate::preferences::PreferenceStore;
use crate::storage::{migrations, HabitStorage, StorageError};

/// Local calendar day of an action row, as `YYYY-MM-DD`
const LOCAL_DAY_SQL: &str = "date(a.timestamp / 1000, 'unixepoch', 'localtime')";

/// Local calendar month of an action row, as `YYYY-MM`
const LOCAL_MONTH_SQL: &str = "strftime('%Y-%m', a.timestamp / 1000, 'unixepoch', 'localtime')";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the HabitStorage trait.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::from_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Open a private in-memory database (useful for testing)
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        // Cascading deletes rely on foreign key enforcement
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }

    /// Helper method to convert a habits row into a Habit
    fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
        let color_str: String = row.get(2)?;
        let color: HabitColor = color_str.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Habit::from_existing(
            HabitId(row.get(0)?),
            row.get(1)?, // name
            color,
            row.get(3)?, // sort_order
            row.get(4)?, // archived
            row.get(5)?, // notes
        ))
    }

    /// Helper method to convert an actions row into an Action
    fn action_from_row(row: &Row<'_>) -> rusqlite::Result<Action> {
        let millis: i64 = row.get(2)?;
        let timestamp = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(2, "Invalid timestamp".to_string(), rusqlite::types::Type::Integer)
        })?;

        Ok(Action::from_existing(
            ActionId(row.get(0)?),
            HabitId(row.get(1)?),
            Some(timestamp),
        ))
    }

    /// Insert one habit row, keeping its id unless it is unsaved
    fn insert_habit_row(conn: &Connection, habit: &Habit, order: i32) -> Result<HabitId, StorageError> {
        let id = (!habit.id.is_unsaved()).then_some(habit.id.value());

        conn.execute(
            "INSERT INTO habits (id, name, color, sort_order, archived, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, habit.name, habit.color.name(), order, habit.archived, habit.notes],
        )?;

        Ok(HabitId(conn.last_insert_rowid()))
    }

    /// Insert one action row, keeping its id unless it is a phantom
    fn insert_action_row(conn: &Connection, action: &Action) -> Result<ActionId, StorageError> {
        let millis = action
            .timestamp_millis()
            .ok_or(StorageError::PhantomAction { habit_id: action.habit_id })?;
        let id = (!action.id.is_phantom()).then_some(action.id.value());

        conn.execute(
            "INSERT INTO actions (id, habit_id, timestamp) VALUES (?1, ?2, ?3)",
            params![id, action.habit_id.value(), millis],
        )?;

        Ok(ActionId(conn.last_insert_rowid()))
    }

    /// Count actions grouped by a SQL bucket expression
    ///
    /// Without a habit id only non-archived habits are counted.
    fn grouped_counts(
        &self,
        bucket_sql: &str,
        habit_id: Option<HabitId>,
    ) -> Result<Vec<(String, u32)>, StorageError> {
        let sql = format!(
            "SELECT {bucket} AS bucket, COUNT(*)
             FROM actions a JOIN habits h ON h.id = a.habit_id
             WHERE (?1 IS NULL AND h.archived = 0) OR a.habit_id = ?1
             GROUP BY bucket
             ORDER BY bucket",
            bucket = bucket_sql
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![habit_id.map(HabitId::value)], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }
}

impl HabitStorage for SqliteStorage {
    fn get_habits(&self) -> Result<Vec<Habit>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, color, sort_order, archived, notes
             FROM habits ORDER BY sort_order, id"
        )?;
        let habit_iter = stmt.query_map([], Self::habit_from_row)?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            habits.push(habit?);
        }

        Ok(habits)
    }

    fn get_habit(&self, habit_id: HabitId) -> Result<Habit, StorageError> {
        self.conn
            .query_row(
                "SELECT id, name, color, sort_order, archived, notes
                 FROM habits WHERE id = ?1",
                params![habit_id.value()],
                Self::habit_from_row,
            )
            .optional()?
            .ok_or(StorageError::HabitNotFound { habit_id })
    }

    fn insert_habits(&self, habits: &[Habit]) -> Result<Vec<HabitId>, StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        let max_order: i64 = tx.query_row(
            "SELECT COALESCE(MAX(sort_order), 0) FROM habits",
            [],
            |row| row.get(0),
        )?;
        let mut next_order = max_order + 1;

        let mut ids = Vec::with_capacity(habits.len());
        for habit in habits {
            let order = if habit.order == 0 {
                let order = i32::try_from(next_order)
                    .map_err(|_| StorageError::SortOrderExhausted { max_order })?;
                next_order += 1;
                order
            } else {
                habit.order
            };
            let id = Self::insert_habit_row(&tx, habit, order)?;
            tracing::debug!("Created habit: {} ({})", habit.name, id);
            ids.push(id);
        }

        tx.commit()?;
        Ok(ids)
    }

    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE habits SET
                name = ?2,
                color = ?3,
                sort_order = ?4,
                archived = ?5,
                notes = ?6
             WHERE id = ?1",
            params![
                habit.id.value(),
                habit.name,
                habit.color.name(),
                habit.order,
                habit.archived,
                habit.notes
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound { habit_id: habit.id });
        }

        tracing::debug!("Updated habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    fn delete_habit(&self, habit_id: HabitId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM habits WHERE id = ?1",
            params![habit_id.value()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound { habit_id });
        }

        tracing::debug!("Deleted habit {} and its actions", habit_id);
        Ok(())
    }

    fn get_all_actions(&self) -> Result<Vec<Action>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, timestamp FROM actions ORDER BY timestamp, id"
        )?;
        let action_iter = stmt.query_map([], Self::action_from_row)?;

        let mut actions = Vec::new();
        for action in action_iter {
            actions.push(action?);
        }

        Ok(actions)
    }

    fn get_actions_for_habit(&self, habit_id: HabitId) -> Result<Vec<Action>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, timestamp FROM actions
             WHERE habit_id = ?1 ORDER BY timestamp, id"
        )?;
        let action_iter = stmt.query_map(params![habit_id.value()], Self::action_from_row)?;

        let mut actions = Vec::new();
        for action in action_iter {
            actions.push(action?);
        }

        Ok(actions)
    }

    fn insert_actions(&self, actions: &[Action]) -> Result<Vec<ActionId>, StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        let mut ids = Vec::with_capacity(actions.len());
        for action in actions {
            let id = Self::insert_action_row(&tx, action)?;
            tracing::debug!("Created action {} for habit {}", id, action.habit_id);
            ids.push(id);
        }

        tx.commit()?;
        Ok(ids)
    }

    fn delete_action(&self, action_id: ActionId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM actions WHERE id = ?1",
            params![action_id.value()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::ActionNotFound { action_id });
        }

        Ok(())
    }

    fn count_actions_by_day(
        &self,
        habit_id: Option<HabitId>,
    ) -> Result<Vec<BucketCount<NaiveDate>>, StorageError> {
        self.grouped_counts(LOCAL_DAY_SQL, habit_id)?
            .into_iter()
            .map(|(day, count)| {
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d").map_err(|e| StorageError::InvalidRow {
                    table: "actions",
                    message: format!("bad day '{}': {}", day, e),
                })?;
                Ok(BucketCount::new(date, count))
            })
            .collect()
    }

    fn count_actions_by_week(
        &self,
        habit_id: Option<HabitId>,
    ) -> Result<Vec<BucketCount<YearWeek>>, StorageError> {
        // SQLite has no ISO week format, so days are folded into weeks here
        let mut weeks: BTreeMap<YearWeek, u32> = BTreeMap::new();
        for day in self.count_actions_by_day(habit_id)? {
            *weeks.entry(YearWeek::of(day.bucket)).or_insert(0) += day.count;
        }

        Ok(weeks
            .into_iter()
            .map(|(week, count)| BucketCount::new(week, count))
            .collect())
    }

    fn count_actions_by_month(
        &self,
        habit_id: Option<HabitId>,
    ) -> Result<Vec<BucketCount<YearMonth>>, StorageError> {
        self.grouped_counts(LOCAL_MONTH_SQL, habit_id)?
            .into_iter()
            .map(|(month, count)| {
                let year_month: YearMonth = month.parse().map_err(|e| StorageError::InvalidRow {
                    table: "actions",
                    message: format!("bad month '{}': {}", month, e),
                })?;
                Ok(BucketCount::new(year_month, count))
            })
            .collect()
    }

    fn total_habit_count(&self) -> Result<u32, StorageError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM habits WHERE archived = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn restore_backup(&self, habits: &[Habit], actions: &[Action]) -> Result<(), StorageError> {
        // Dropping the transaction on error rolls everything back
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM actions", [])?;
        tx.execute("DELETE FROM habits", [])?;

        for habit in habits {
            Self::insert_habit_row(&tx, habit, habit.order)?;
        }
        for action in actions {
            Self::insert_action_row(&tx, action)?;
        }

        tx.commit()?;

        tracing::info!(
            "Restored backup with {} habits and {} actions",
            habits.len(),
            actions.len()
        );
        Ok(())
    }
}

impl PreferenceStore for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
        Ok(())
    }
}
