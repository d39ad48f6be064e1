/// Top habits and busiest days of the week

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use chrono::{Datelike, TimeZone, Weekday};
use crate::domain::{Action, Habit, HabitId};

/// A habit together with how often it was completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopHabit {
    pub habit_id: HabitId,
    pub name: String,
    pub count: u32,
}

/// Number of completions that fell on a given day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopDay {
    pub weekday: Weekday,
    pub count: u32,
}

/// Non-archived habits ranked by completion count
///
/// Ties keep the list order (`order`, then id). At most `limit` entries are returned.
pub fn top_habits(habits: &[Habit], actions: &[Action], limit: usize) -> Vec<TopHabit> {
    let mut counts: HashMap<HabitId, u32> = HashMap::new();
    for action in actions.iter().filter(|action| !action.is_phantom()) {
        *counts.entry(action.habit_id).or_insert(0) += 1;
    }

    let mut active: Vec<&Habit> = habits.iter().filter(|habit| !habit.archived).collect();
    active.sort_by_key(|habit| (habit.order, habit.id));

    let mut ranked: Vec<TopHabit> = active
        .into_iter()
        .map(|habit| TopHabit {
            habit_id: habit.id,
            name: habit.name.clone(),
            count: counts.get(&habit.id).copied().unwrap_or(0),
        })
        .collect();

    // Stable sort keeps list order for equal counts
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}

/// Completions per day of the week, busiest first
///
/// All seven days are returned. Ties keep Monday-first order.
pub fn top_week_days<Tz: TimeZone>(actions: &[Action], tz: &Tz) -> Vec<TopDay> {
    let mut counts = [0u32; 7];
    for date in actions.iter().filter_map(|action| action.local_date(tz)) {
        counts[date.weekday().num_days_from_monday() as usize] += 1;
    }

    let mut weekday = Weekday::Mon;
    let mut days = Vec::with_capacity(counts.len());
    for count in counts {
        days.push(TopDay { weekday, count });
        weekday = weekday.succ();
    }

    days.sort_by(|a, b| b.count.cmp(&a.count));
    days
}
