/// Basic integration tests
use chrono::{Duration, Local, NaiveDate, TimeZone, Utc};
use habit_stats::analytics::YearMonth;
use habit_stats::*;
use tempfile::NamedTempFile;

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    #[test]
    fn test_tracker_basic_workflow() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let tracker = HabitTracker::new(temp_file.path().to_path_buf(), AnalyticsConfig::default())
            .expect("Failed to create tracker");

        let run = tracker.add_habit("Run", HabitColor::Red, "").unwrap();
        let read = tracker.add_habit("Read", HabitColor::Green, "").unwrap();
        assert!(run.order < read.order);

        let today = NaiveDate::from_ymd_opt(2021, 10, 16).unwrap();
        for offset in 0..4 {
            let day = today - Duration::days(offset);
            let ts = Local
                .from_local_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
                .single()
                .unwrap()
                .with_timezone(&Utc);
            tracker.log_action(run.id, ts).unwrap();
        }

        let overviews = tracker.overviews(today, &Local).unwrap();
        assert_eq!(overviews.len(), 2);
        assert_eq!(overviews[0].history, ActionHistory::Streak(4));
        assert_eq!(overviews[0].longest_streak, 4);
        assert_eq!(overviews[1].history, ActionHistory::Clean);
        assert_eq!(overviews[1].completion_rate, 0.0);

        // Local noon keeps every action inside the local day it was logged for
        let heatmap = tracker
            .analytics()
            .heatmap(tracker.storage(), YearMonth::new(2021, 10))
            .unwrap();
        assert_eq!(heatmap.bucket_count, 3);
        assert_eq!(heatmap.days.len(), 4);
        assert_eq!(heatmap.day(today).count, 1);
        assert_eq!(heatmap.day(today).bucket, 1);
        assert_eq!(heatmap.day(today + Duration::days(1)).count, 0);
    }

    #[test]
    fn test_database_persistence() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();

        let habit_id = {
            let tracker = HabitTracker::new(db_path.clone(), AnalyticsConfig::default())
                .expect("Failed to create first tracker");
            let habit = tracker.add_habit("Journal", HabitColor::Yellow, "evening").unwrap();
            tracker.log_action(habit.id, Utc::now()).unwrap();
            habit.id
        };

        let reopened = HabitTracker::new(db_path, AnalyticsConfig::default())
            .expect("Failed to reopen tracker");
        let habit = reopened.storage().get_habit(habit_id).unwrap();
        assert_eq!(habit.name, "Journal");
        assert_eq!(habit.notes, "evening");
        assert_eq!(reopened.storage().get_actions_for_habit(habit_id).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_habit_removes_actions() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf())
            .expect("Failed to create storage");
        let tracker = HabitTracker::with_storage(storage, AnalyticsConfig::default());

        let keep = tracker.add_habit("Keep", HabitColor::Blue, "").unwrap();
        let dropped = tracker.add_habit("Drop", HabitColor::Pink, "").unwrap();
        tracker.log_action(keep.id, Utc::now()).unwrap();
        tracker.log_action(dropped.id, Utc::now()).unwrap();

        tracker.storage().delete_habit(dropped.id).unwrap();

        let actions = tracker.storage().get_all_actions().unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].habit_id, keep.id);
        assert_eq!(tracker.storage().total_habit_count().unwrap(), 1);
    }

    #[test]
    fn test_preferences_survive_reopen() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();

        {
            let tracker = HabitTracker::new(db_path.clone(), AnalyticsConfig::default()).unwrap();
            tracker.preferences().set_onboarding_step(2).unwrap();
            tracker.preferences().set_show_heatmap(false).unwrap();
        }

        let tracker = HabitTracker::new(db_path, AnalyticsConfig::default()).unwrap();
        assert_eq!(tracker.preferences().onboarding_step().unwrap(), 2);
        assert!(!tracker.preferences().show_heatmap().unwrap());
    }
}
