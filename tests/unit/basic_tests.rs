/// Basic unit tests to verify core functionality
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use habit_stats::analytics::{self, BucketCount, YearMonth, YearWeek};
use habit_stats::*;

fn noon(date: NaiveDate) -> chrono::DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
}

fn oct(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 10, day).unwrap()
}

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    #[test]
    fn test_habit_creation() {
        let habit = Habit::new("Test Habit".to_string(), HabitColor::Green, "notes".to_string());

        assert!(habit.is_ok());
        let habit = habit.unwrap();
        assert_eq!(habit.name, "Test Habit");
        assert!(habit.id.is_unsaved());
        assert!(habit.has_notes());
    }

    #[test]
    fn test_habit_name_rules() {
        assert!(Habit::new("".to_string(), HabitColor::Blue, String::new()).is_err());
        assert!(Habit::new("x".repeat(101), HabitColor::Blue, String::new()).is_err());
        assert!(Habit::new("x".repeat(100), HabitColor::Blue, String::new()).is_ok());
    }

    #[test]
    fn test_streak_boundaries() {
        let habit_id = HabitId(1);
        let today = oct(16);

        let done_today = [Action::new(habit_id, noon(today))];
        assert_eq!(ActionHistory::classify(&done_today, today, &Utc), ActionHistory::Streak(1));

        let done_yesterday = [Action::new(habit_id, noon(today - Duration::days(1)))];
        assert_eq!(
            ActionHistory::classify(&done_yesterday, today, &Utc),
            ActionHistory::MissedDays(1)
        );

        let only_tomorrow = [Action::new(habit_id, noon(today + Duration::days(1)))];
        assert_eq!(ActionHistory::classify(&only_tomorrow, today, &Utc), ActionHistory::Clean);

        assert_eq!(ActionHistory::classify(&[], today, &Utc), ActionHistory::Clean);
    }

    #[test]
    fn test_same_day_latest_id_wins() {
        let habit_id = HabitId(1);
        let today = oct(16);
        let actions = [
            Action::from_existing(ActionId(9), habit_id, Some(noon(today))),
            Action::from_existing(ActionId(4), habit_id, Some(noon(today))),
        ];

        let slots = analytics::recent_activity(habit_id, &actions, 2, today, &Utc);
        assert_eq!(slots.len(), 2);
        assert!(!slots[0].toggled);
        assert!(slots[0].action.is_phantom());
        assert_eq!(slots[1].action.id, ActionId(9));
    }

    #[test]
    fn test_monthly_gap_fill() {
        let rows = [
            BucketCount::new(YearMonth::new(2021, 8), 1),
            BucketCount::new(YearMonth::new(2021, 10), 12),
        ];

        let values: Vec<(String, u32)> = analytics::histogram::monthly_chart(&rows, oct(16))
            .into_iter()
            .map(|item| (item.label, item.value))
            .collect();
        assert_eq!(
            values,
            vec![("8".to_string(), 1), ("9".to_string(), 0), ("10".to_string(), 12)]
        );

        let november = NaiveDate::from_ymd_opt(2021, 11, 2).unwrap();
        let chart = analytics::histogram::monthly_chart(&rows, november);
        assert_eq!(chart.len(), 4);
        assert_eq!(chart[3].value, 0);
    }

    #[test]
    fn test_empty_weekly_chart_has_current_week() {
        let chart = analytics::histogram::weekly_chart(&[] as &[BucketCount<YearWeek>], oct(16));
        assert_eq!(chart.len(), 1);
        assert_eq!((chart[0].label.as_str(), chart[0].year, chart[0].value), ("41", 2021, 0));
    }

    #[test]
    fn test_heatmap_worked_maxima() {
        assert_eq!(analytics::heatmap::bucket_maxima(6), vec![0, 1, 3, 4, 6]);
        assert_eq!(analytics::heatmap::bucket_maxima(7), vec![0, 1, 3, 5, 7]);
        assert_eq!(analytics::heatmap::bucket_maxima(8), vec![0, 2, 4, 6, 8]);

        let counts: Vec<u32> = (0..=6).map(analytics::heatmap::bucket_count).collect();
        assert_eq!(counts, vec![0, 2, 3, 4, 5, 5, 5]);
    }

    #[test]
    fn test_completion_rate() {
        let today = oct(20);
        let rate = analytics::completion_rate(Some(noon(today)), 1, today, &Utc);
        assert!((rate - 1.0).abs() < 1e-9);

        let rate = analytics::completion_rate(Some(noon(oct(1))), 1, today, &Utc);
        assert!((rate - 0.05).abs() < 1e-9);

        assert_eq!(analytics::completion_rate(None, 0, today, &Utc), 0.0);
    }

    #[test]
    fn test_storage_creation() {
        let temp_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf());
        assert!(storage.is_ok());

        // Storage is usable behind the trait object
        let storage = storage.unwrap();
        let dynamic: &dyn HabitStorage = &storage;
        assert_eq!(dynamic.total_habit_count().unwrap(), 0);
    }
}
