/// Streak and missed-day classification
///
/// This module turns the full action log of a habit into an ActionHistory:
/// the habit is either untouched, on a streak that includes today, or has
/// been skipped for some number of days.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use chrono::{NaiveDate, TimeZone};
use crate::domain::Action;

/// Where a habit stands relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "days")]
pub enum ActionHistory {
    /// No activity yet, or only future-dated activity
    Clean,
    /// Consecutive days ending today with at least one action (always >= 1)
    Streak(u32),
    /// Days since the most recent action, not counting today (always >= 1)
    MissedDays(u32),
}

impl ActionHistory {
    /// Classify a habit's full action list against `today`
    ///
    /// Actions are placed on calendar days using `tz`. Actions after today are
    /// ignored, phantom actions have no day and are ignored as well.
    pub fn classify<Tz: TimeZone>(actions: &[Action], today: NaiveDate, tz: &Tz) -> Self {
        let days: BTreeSet<NaiveDate> = actions
            .iter()
            .filter_map(|action| action.local_date(tz))
            .filter(|day| *day <= today)
            .collect();

        let Some(&latest) = days.iter().next_back() else {
            return ActionHistory::Clean;
        };

        if latest == today {
            let mut streak = 0;
            let mut checking_date = Some(today);

            // Count consecutive days backwards
            while let Some(day) = checking_date {
                if !days.contains(&day) {
                    break;
                }
                streak += 1;
                checking_date = day.pred_opt();
            }

            ActionHistory::Streak(streak)
        } else {
            let missed = (today - latest).num_days();
            ActionHistory::MissedDays(u32::try_from(missed).unwrap_or(u32::MAX))
        }
    }

    /// Current streak length, zero unless the habit was done today
    pub fn streak_days(&self) -> u32 {
        match self {
            ActionHistory::Streak(days) => *days,
            _ => 0,
        }
    }

    /// Short human readable summary
    pub fn describe(&self) -> String {
        match self {
            ActionHistory::Clean => "Not started yet".to_string(),
            ActionHistory::Streak(1) => "Done today".to_string(),
            ActionHistory::Streak(days) => format!("{} day streak", days),
            ActionHistory::MissedDays(1) => "Missed yesterday".to_string(),
            ActionHistory::MissedDays(days) => format!("Missed {} days", days),
        }
    }
}

/// Longest run of consecutive days with at least one action
///
/// Unlike [`ActionHistory::classify`] the run does not have to end today.
pub fn longest_streak<Tz: TimeZone>(actions: &[Action], tz: &Tz) -> u32 {
    let days: BTreeSet<NaiveDate> = actions
        .iter()
        .filter_map(|action| action.local_date(tz))
        .collect();

    let mut longest = 0;
    let mut current = 0;
    let mut last_date: Option<NaiveDate> = None;

    for day in days {
        current = match last_date {
            Some(last) if last.succ_opt() == Some(day) => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        last_date = Some(day);
    }

    longest
}
