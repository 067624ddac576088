//! Chart models for the listening bar graphs.
//!
//! Two charts sit on the stats screen: listening per hour over the last day
//! and a daily trend over the last week or month. Both are thin wrappers over
//! [`series::bucketize_with_policy`] that add labels, totals and bar heights.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use super::series;
use crate::format;
use crate::types::{BucketPoint, DuplicatePolicy, Granularity, RawObservation};

/// Default number of hourly buckets.
pub const HOURLY_WINDOW: usize = 24;

/// Default number of daily buckets.
pub const DAILY_WINDOW: usize = 7;

/// Window and duplicate handling for a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOptions {
    /// Number of bars
    pub window_size: usize,
    /// How observations sharing a bucket are combined
    pub policy: DuplicatePolicy,
}

impl ChartOptions {
    pub fn hourly() -> Self {
        Self {
            window_size: HOURLY_WINDOW,
            policy: DuplicatePolicy::default(),
        }
    }

    pub fn daily(days: usize) -> Self {
        Self {
            window_size: days,
            policy: DuplicatePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// A single bar ready for rendering.
///
/// Serializes flat: `timestamp`, `value`, `label` and `height`.
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = ""))]
pub struct ChartBar<Tz: TimeZone> {
    #[serde(flatten)]
    pub point: BucketPoint<Tz>,
    /// Axis label ("1PM", "Jan 5")
    pub label: String,
    /// Bar height relative to the tallest bar, in `[0.0, 1.0]`
    pub height: f64,
}

/// Accessors shared by the bar charts.
pub trait BarChart<Tz: TimeZone> {
    fn bars(&self) -> &[ChartBar<Tz>];

    /// True when bucketing failed and there is nothing to draw.
    fn is_empty(&self) -> bool {
        self.bars().is_empty()
    }

    /// True when at least one bar is non-zero.
    fn has_activity(&self) -> bool {
        self.bars().iter().any(|b| b.point.value > 0)
    }

    fn total(&self) -> u64 {
        self.bars()
            .iter()
            .fold(0u64, |acc, b| acc.saturating_add(b.point.value))
    }

    fn max_value(&self) -> u64 {
        self.bars().iter().map(|b| b.point.value).max().unwrap_or(0)
    }

    /// Earliest bar holding the maximum value, if any bar is non-zero.
    fn peak(&self) -> Option<&ChartBar<Tz>> {
        let max = self.max_value();
        if max == 0 {
            return None;
        }
        self.bars().iter().find(|b| b.point.value == max)
    }
}

fn to_bars<Tz, F>(points: Vec<BucketPoint<Tz>>, label: F) -> Vec<ChartBar<Tz>>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
    F: Fn(&DateTime<Tz>) -> String,
{
    let max = points.iter().map(|p| p.value).max().unwrap_or(0);
    points
        .into_iter()
        .map(|point| {
            let height = if max == 0 {
                0.0
            } else {
                point.value as f64 / max as f64
            };
            ChartBar {
                label: label(&point.timestamp),
                point,
                height,
            }
        })
        .collect()
}

// ============================================
// Hourly listening
// ============================================

/// Listening per hour, ending with the current hour.
#[derive(Debug, Clone)]
pub struct HourlyListeningChart<Tz: TimeZone> {
    bars: Vec<ChartBar<Tz>>,
}

impl<Tz> HourlyListeningChart<Tz>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    /// The last 24 hours with first-wins duplicate handling.
    pub fn build(observations: &[RawObservation], now: DateTime<Tz>) -> Self {
        Self::build_with(observations, now, &ChartOptions::hourly())
    }

    pub fn build_with(
        observations: &[RawObservation],
        now: DateTime<Tz>,
        options: &ChartOptions,
    ) -> Self {
        let points = series::bucketize_with_policy(
            observations,
            options.window_size,
            Granularity::Hour,
            now,
            options.policy,
        );
        Self {
            bars: to_bars(points, format::hour_label),
        }
    }
}

impl<Tz: TimeZone> BarChart<Tz> for HourlyListeningChart<Tz> {
    fn bars(&self) -> &[ChartBar<Tz>] {
        &self.bars
    }
}

// ============================================
// Daily trend
// ============================================

/// Daily totals, ending with today.
#[derive(Debug, Clone)]
pub struct DailyTrendChart<Tz: TimeZone> {
    bars: Vec<ChartBar<Tz>>,
}

impl<Tz> DailyTrendChart<Tz>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    /// The last `days` days with first-wins duplicate handling.
    pub fn build(observations: &[RawObservation], days: usize, now: DateTime<Tz>) -> Self {
        Self::build_with(observations, now, &ChartOptions::daily(days))
    }

    pub fn build_with(
        observations: &[RawObservation],
        now: DateTime<Tz>,
        options: &ChartOptions,
    ) -> Self {
        let points = series::bucketize_with_policy(
            observations,
            options.window_size,
            Granularity::Day,
            now,
            options.policy,
        );
        Self {
            bars: to_bars(points, format::day_label),
        }
    }
}

impl<Tz: TimeZone> DailyTrendChart<Tz> {
    /// Days with any listening.
    pub fn active_days(&self) -> usize {
        self.bars.iter().filter(|b| b.point.value > 0).count()
    }

    /// Consecutive days with listening, counted back from today.
    pub fn current_streak(&self) -> usize {
        self.bars
            .iter()
            .rev()
            .take_while(|b| b.point.value > 0)
            .count()
    }
}

impl<Tz: TimeZone> BarChart<Tz> for DailyTrendChart<Tz> {
    fn bars(&self) -> &[ChartBar<Tz>] {
        &self.bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn utc(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_hourly_chart_labels_and_heights() {
        let observations = [
            RawObservation::new(utc(5, 13), 30),
            RawObservation::new(utc(5, 12), 15),
        ];
        let chart = HourlyListeningChart::build(&observations, utc(5, 13));

        assert_eq!(chart.bars().len(), 24);
        let last = chart.bars().last().unwrap();
        assert_eq!(last.label, "1PM");
        assert_eq!(last.height, 1.0);
        assert_eq!(chart.bars()[22].height, 0.5);
        assert_eq!(chart.bars()[0].label, "2PM");
        assert_eq!(chart.total(), 45);
        assert_eq!(chart.peak().unwrap().label, "1PM");
    }

    #[test]
    fn test_bar_serializes_flat() {
        let observations = [RawObservation::new(utc(5, 13), 30)];
        let chart = HourlyListeningChart::build(&observations, utc(5, 13));

        let json = serde_json::to_value(chart.bars().last().unwrap()).unwrap();
        assert_eq!(json["timestamp"], "2024-01-05T13:00:00+00:00");
        assert_eq!(json["value"], 30);
        assert_eq!(json["label"], "1PM");
        assert_eq!(json["height"], 1.0);
        assert!(json.get("point").is_none());
    }

    #[test]
    fn test_peak_prefers_earliest() {
        let observations = [
            RawObservation::new(utc(3, 9), 8),
            RawObservation::new(utc(5, 9), 8),
        ];
        let chart = DailyTrendChart::build(&observations, 7, utc(5, 20));
        assert_eq!(chart.peak().unwrap().label, "Jan 3");
    }

    #[test]
    fn test_daily_chart_without_activity() {
        let chart = DailyTrendChart::build(&[], 7, utc(5, 20));
        assert!(!chart.is_empty());
        assert!(!chart.has_activity());
        assert!(chart.peak().is_none());
        assert!(chart.bars().iter().all(|b| b.height == 0.0));
    }

    #[test]
    fn test_daily_streak_and_active_days() {
        let observations = [
            RawObservation::new(utc(1, 8), 3),
            RawObservation::new(utc(4, 8), 1),
            RawObservation::new(utc(5, 8), 2),
        ];
        let chart = DailyTrendChart::build(&observations, 7, utc(5, 22));
        assert_eq!(chart.active_days(), 3);
        assert_eq!(chart.current_streak(), 2);
        assert_eq!(chart.bars()[0].label, "Dec 30");
    }

    #[test]
    fn test_options_policy_is_applied() {
        let observations = [
            RawObservation::new(utc(5, 8), 3),
            RawObservation::new(utc(5, 9), 4),
        ];
        let options = ChartOptions::daily(7).with_policy(DuplicatePolicy::Sum);
        let chart = DailyTrendChart::build_with(&observations, utc(5, 22), &options);
        assert_eq!(chart.bars().last().unwrap().point.value, 7);
    }

    #[test]
    fn test_failed_bucketing_gives_empty_chart() {
        let chart = DailyTrendChart::build(&[], 30, DateTime::<Utc>::MIN_UTC);
        assert!(chart.is_empty());
        assert_eq!(chart.total(), 0);
    }
}
