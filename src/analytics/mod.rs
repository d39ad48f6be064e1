/// Analytics engine for turning stored actions into display models
///
/// The submodules are pure functions over in-memory rows. [`AnalyticsEngine`]
/// pulls those rows from a [`HabitStorage`] and hands them through. The
/// current date and time zone are always passed in by the caller.

pub mod buckets;
pub mod completion;
pub mod heatmap;
pub mod histogram;
pub mod top;
pub mod window;

pub use buckets::*;
pub use completion::completion_rate;
pub use heatmap::{build_heatmap, BucketInfo, HeatmapMonth, LegendBucket, MAX_BUCKETS};
pub use histogram::{gap_filled_chart, BucketCount, ChartItem};
pub use top::{top_habits, top_week_days, TopDay, TopHabit};
pub use window::{recent_activity, ActivitySlot};

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

use crate::domain::{longest_streak, ActionHistory, Habit, HabitId};
use crate::storage::{HabitStorage, StorageError};

/// Tunables for the analytics engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// Number of day slots in the recent activity row
    pub recent_window_days: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            recent_window_days: 7,
        }
    }
}

/// Everything the dashboard shows for one habit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitOverview {
    pub habit: Habit,
    pub recent: Vec<ActivitySlot>,
    pub history: ActionHistory,
    pub completion_rate: f64,
    pub longest_streak: u32,
}

/// Analytics engine for processing habit data
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
}

impl AnalyticsEngine {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Overview of a single habit as of `today`
    pub fn habit_overview<S, Tz>(
        &self,
        storage: &S,
        habit: Habit,
        today: NaiveDate,
        tz: &Tz,
    ) -> Result<HabitOverview, StorageError>
    where
        S: HabitStorage + ?Sized,
        Tz: TimeZone,
    {
        let actions = storage.get_actions_for_habit(habit.id)?;

        let first_activity = actions.iter().filter_map(|action| action.timestamp).min();
        let action_count = actions.iter().filter(|action| !action.is_phantom()).count() as u32;

        Ok(HabitOverview {
            recent: recent_activity(habit.id, &actions, self.config.recent_window_days, today, tz),
            history: ActionHistory::classify(&actions, today, tz),
            completion_rate: completion_rate(first_activity, action_count, today, tz),
            longest_streak: longest_streak(&actions, tz),
            habit,
        })
    }

    /// Overviews of every non-archived habit in display order
    pub fn habit_overviews<S, Tz>(
        &self,
        storage: &S,
        today: NaiveDate,
        tz: &Tz,
    ) -> Result<Vec<HabitOverview>, StorageError>
    where
        S: HabitStorage + ?Sized,
        Tz: TimeZone,
    {
        let habits = storage.get_habits()?;
        tracing::debug!("Building overviews for {} habits", habits.len());

        habits
            .into_iter()
            .filter(|habit| !habit.archived)
            .map(|habit| self.habit_overview(storage, habit, today, tz))
            .collect()
    }

    /// Actions per ISO week up to the current week
    pub fn weekly_chart<S: HabitStorage + ?Sized>(
        &self,
        storage: &S,
        habit_id: Option<HabitId>,
        today: NaiveDate,
    ) -> Result<Vec<ChartItem>, StorageError> {
        let rows = storage.count_actions_by_week(habit_id)?;
        Ok(histogram::weekly_chart(&rows, today))
    }

    /// Actions per month up to the current month
    pub fn monthly_chart<S: HabitStorage + ?Sized>(
        &self,
        storage: &S,
        habit_id: Option<HabitId>,
        today: NaiveDate,
    ) -> Result<Vec<ChartItem>, StorageError> {
        let rows = storage.count_actions_by_month(habit_id)?;
        Ok(histogram::monthly_chart(&rows, today))
    }

    /// Heatmap of completions across all active habits for one month
    pub fn heatmap<S: HabitStorage + ?Sized>(
        &self,
        storage: &S,
        year_month: YearMonth,
    ) -> Result<HeatmapMonth, StorageError> {
        let rows = storage.count_actions_by_day(None)?;
        let total = storage.total_habit_count()?;
        Ok(build_heatmap(&rows, year_month, total))
    }

    pub fn top_habits<S: HabitStorage + ?Sized>(
        &self,
        storage: &S,
        limit: usize,
    ) -> Result<Vec<TopHabit>, StorageError> {
        let habits = storage.get_habits()?;
        let actions = storage.get_all_actions()?;
        Ok(top_habits(&habits, &actions, limit))
    }

    pub fn top_week_days<S, Tz>(&self, storage: &S, tz: &Tz) -> Result<Vec<TopDay>, StorageError>
    where
        S: HabitStorage + ?Sized,
        Tz: TimeZone,
    {
        let actions = storage.get_all_actions()?;
        Ok(top_week_days(&actions, tz))
    }
}
