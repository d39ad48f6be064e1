/// Monthly heatmap with a dynamic legend
///
/// The legend has one bucket per possible daily completion count while there
/// are few habits, and collapses to five buckets spread evenly over
/// `0..=total_habit_count` once there are four habits or more.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::analytics::buckets::YearMonth;
use crate::analytics::histogram::BucketCount;

/// Upper bound on the number of legend buckets
pub const MAX_BUCKETS: u32 = 5;

/// Completion count of one day and the legend bucket it falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketInfo {
    pub count: u32,
    pub bucket: u32,
}

/// One legend entry: the highest daily count drawn with this bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendBucket {
    pub index: u32,
    pub max_value: u32,
}

/// Heatmap data for a single calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapMonth {
    pub year_month: YearMonth,
    /// Only days of `year_month` that had rows
    pub days: BTreeMap<NaiveDate, BucketInfo>,
    pub total_habit_count: u32,
    pub bucket_count: u32,
    pub buckets: Vec<LegendBucket>,
}

impl HeatmapMonth {
    /// Bucket info for a day, days without rows fall in bucket 0
    pub fn day(&self, date: NaiveDate) -> BucketInfo {
        self.days
            .get(&date)
            .copied()
            .unwrap_or(BucketInfo { count: 0, bucket: 0 })
    }

    /// Highest count drawn with the given legend bucket
    ///
    /// # Panics
    ///
    /// Panics if `bucket` is not below `bucket_count`. Bucket indexes handed
    /// out by this module are always in range.
    pub fn max_value_of(&self, bucket: u32) -> u32 {
        assert!(
            bucket < self.bucket_count,
            "heatmap bucket {} out of range (bucket count {})",
            bucket,
            self.bucket_count
        );
        self.buckets[bucket as usize].max_value
    }
}

/// Number of legend buckets for a given number of active habits
pub fn bucket_count(total_habit_count: u32) -> u32 {
    if total_habit_count == 0 {
        0
    } else {
        total_habit_count.saturating_add(1).min(MAX_BUCKETS)
    }
}

/// Highest count of each legend bucket, strictly increasing
///
/// The first bucket always tops out at 0 and the last at
/// `total_habit_count`. In between, bucket `i` of `n` tops out at
/// `i * total / (n - 1)` rounded down, so 6 habits give `[0, 1, 3, 4, 6]`.
pub fn bucket_maxima(total_habit_count: u32) -> Vec<u32> {
    let count = bucket_count(total_habit_count);
    if count == 0 {
        return Vec::new();
    }

    let steps = u64::from(count - 1);
    let total = u64::from(total_habit_count);
    (0..u64::from(count))
        .map(|i| (i * total / steps) as u32)
        .collect()
}

/// Smallest bucket whose maximum is at least `count`
///
/// Counts above the last maximum are clamped into the last bucket.
pub fn assign_bucket(count: u32, maxima: &[u32]) -> u32 {
    let index = maxima
        .iter()
        .position(|max| count <= *max)
        .unwrap_or(maxima.len().saturating_sub(1));
    index as u32
}

/// Build the heatmap for `year_month` from per-day completion counts
///
/// Rows outside the month are left out of the result entirely. With no
/// active habits the legend is empty and no days are reported.
pub fn build_heatmap(
    rows: &[BucketCount<NaiveDate>],
    year_month: YearMonth,
    total_habit_count: u32,
) -> HeatmapMonth {
    let maxima = bucket_maxima(total_habit_count);

    let days = if maxima.is_empty() {
        BTreeMap::new()
    } else {
        rows.iter()
            .filter(|row| year_month.contains(row.bucket))
            .map(|row| {
                let info = BucketInfo {
                    count: row.count,
                    bucket: assign_bucket(row.count, &maxima),
                };
                (row.bucket, info)
            })
            .collect()
    };

    let buckets = maxima
        .iter()
        .enumerate()
        .map(|(index, max_value)| LegendBucket {
            index: index as u32,
            max_value: *max_value,
        })
        .collect();

    HeatmapMonth {
        year_month,
        days,
        total_habit_count,
        bucket_count: maxima.len() as u32,
        buckets,
    }
}
