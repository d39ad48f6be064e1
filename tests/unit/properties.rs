/// Property tests for the windowing and heatmap rules
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use habit_stats::analytics::heatmap::{assign_bucket, bucket_count, bucket_maxima};
use habit_stats::analytics::recent_activity;
use habit_stats::{Action, ActionId, HabitId};
use proptest::prelude::*;

proptest! {
    #[test]
    fn window_has_one_slot_per_day(
        days in 0usize..60,
        offsets in prop::collection::vec(-90i64..30, 0..40),
    ) {
        let today = NaiveDate::from_ymd_opt(2021, 10, 16).unwrap();
        let habit_id = HabitId(3);
        let actions: Vec<Action> = offsets
            .iter()
            .enumerate()
            .map(|(index, offset)| {
                let date = today + Duration::days(*offset);
                let ts = Utc.from_utc_datetime(&date.and_hms_opt(9, 0, 0).unwrap());
                Action::from_existing(ActionId(index as i64 + 1), habit_id, Some(ts))
            })
            .collect();

        let slots = recent_activity(habit_id, &actions, days, today, &Utc);
        prop_assert_eq!(slots.len(), days);

        let first_day = today - Duration::days(days as i64 - 1);
        for (index, slot) in slots.iter().enumerate() {
            prop_assert_eq!(slot.date, first_day + Duration::days(index as i64));
            prop_assert!(slot.date <= today);
            if let Some(date) = slot.action.local_date(&Utc) {
                prop_assert_eq!(date, slot.date);
            }
            prop_assert_eq!(slot.toggled, !slot.action.is_phantom());
        }
    }

    #[test]
    fn heatmap_maxima_are_strictly_increasing(total in 1u32..=50) {
        let maxima = bucket_maxima(total);

        prop_assert_eq!(maxima.len() as u32, bucket_count(total));
        prop_assert_eq!(maxima[0], 0);
        prop_assert_eq!(*maxima.last().unwrap(), total);
        for pair in maxima.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn heatmap_bucket_grows_with_count(total in 1u32..=50, a in 0u32..80, b in 0u32..80) {
        let maxima = bucket_maxima(total);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };

        let low_bucket = assign_bucket(low, &maxima);
        let high_bucket = assign_bucket(high, &maxima);
        prop_assert!(low_bucket <= high_bucket);
        prop_assert!((high_bucket as usize) < maxima.len());
        if low <= total {
            prop_assert!(low <= maxima[low_bucket as usize]);
        }
    }
}
