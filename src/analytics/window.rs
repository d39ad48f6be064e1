/// Recent activity window
///
/// Builds the fixed row of day toggles shown next to each habit: one slot
/// per day for the last N days, oldest first.

use serde::{Deserialize, Serialize};
use chrono::{Duration, NaiveDate, TimeZone};
use crate::domain::{Action, HabitId};

/// One day of the recent activity window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySlot {
    /// Calendar day this slot stands for
    pub date: NaiveDate,
    /// The real action for that day, or a phantom when `toggled` is false
    pub action: Action,
    pub toggled: bool,
}

impl ActivitySlot {
    fn done(date: NaiveDate, action: Action) -> Self {
        Self {
            date,
            action,
            toggled: true,
        }
    }

    fn empty(date: NaiveDate, habit_id: HabitId) -> Self {
        Self {
            date,
            action: Action::phantom(habit_id),
            toggled: false,
        }
    }
}

/// Slots for the `days` days ending at `today`, oldest first
///
/// The output always has exactly `days` entries. Actions outside the window
/// are ignored. When several actions fall on the same day the one with the
/// highest id is used.
pub fn recent_activity<Tz: TimeZone>(
    habit_id: HabitId,
    actions: &[Action],
    days: usize,
    today: NaiveDate,
    tz: &Tz,
) -> Vec<ActivitySlot> {
    let mut slots = Vec::with_capacity(days);

    for offset in (0..days).rev() {
        let Some(date) = today.checked_sub_signed(Duration::days(offset as i64)) else {
            continue;
        };

        let latest = actions
            .iter()
            .filter(|action| action.local_date(tz) == Some(date))
            .max_by_key(|action| action.id);

        slots.push(match latest {
            Some(action) => ActivitySlot::done(date, action.clone()),
            None => ActivitySlot::empty(date, habit_id),
        });
    }

    slots
}
