/// Completion rate since the first recorded action

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Share of days since the first action on which the habit was done
///
/// `rate = action_count / max(1, days(first, today) + 1)`, counting the first
/// day itself. A missing first activity is treated as the Unix epoch. The
/// ratio is not clamped, so several actions per day can push it above 1.
pub fn completion_rate<Tz: TimeZone>(
    first_activity: Option<DateTime<Utc>>,
    action_count: u32,
    today: NaiveDate,
    tz: &Tz,
) -> f64 {
    if action_count == 0 {
        return 0.0;
    }

    let first = first_activity.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let first_day = first.with_timezone(tz).date_naive();
    let elapsed_days = ((today - first_day).num_days() + 1).max(1);

    f64::from(action_count) / elapsed_days as f64
}
