/// Weekly and monthly completion charts
///
/// Storage hands over counts that are already grouped per bucket. This module
/// only fills the gaps between them and extends the series up to the bucket
/// containing today, so a chart always ends at the current period.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::analytics::buckets::{sequence_between, CalendarBucket, YearMonth, YearWeek};

/// One bar of a chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartItem {
    /// Week or month number, without zero padding
    pub label: String,
    pub year: i32,
    pub value: u32,
}

/// A pre-grouped count for one bucket, as produced by storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCount<B> {
    pub bucket: B,
    pub count: u32,
}

impl<B> BucketCount<B> {
    pub fn new(bucket: B, count: u32) -> Self {
        Self { bucket, count }
    }
}

/// Gap-filled chart from the earliest bucket in `rows` through today's bucket
///
/// With no rows the chart holds a single zero item for today's bucket. Rows
/// after today's bucket are dropped. Should a bucket appear twice, the later
/// row wins.
pub fn gap_filled_chart<B: CalendarBucket>(rows: &[BucketCount<B>], today: NaiveDate) -> Vec<ChartItem> {
    let current = B::of(today);
    let counts: BTreeMap<B, u32> = rows.iter().map(|row| (row.bucket, row.count)).collect();

    let start = counts
        .keys()
        .next()
        .copied()
        .map_or(current, |earliest| earliest.min(current));

    sequence_between(start, current)
        .into_iter()
        .map(|bucket| ChartItem {
            label: bucket.label(),
            year: bucket.year(),
            value: counts.get(&bucket).copied().unwrap_or(0),
        })
        .collect()
}

pub fn weekly_chart(rows: &[BucketCount<YearWeek>], today: NaiveDate) -> Vec<ChartItem> {
    gap_filled_chart(rows, today)
}

pub fn monthly_chart(rows: &[BucketCount<YearMonth>], today: NaiveDate) -> Vec<ChartItem> {
    gap_filled_chart(rows, today)
}
