//! Dense time series for bar charts.
//!
//! Turns a sparse list of [`RawObservation`]s into a fixed-length,
//! gap-free sequence of [`BucketPoint`]s ending at the bucket that contains
//! "now". Alignment happens in the calendar of `now`, so a daily series built
//! with a `+05:30` clock has buckets starting at local midnight.
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use spinlog_core::analytics::series::bucketize;
//! use spinlog_core::{Granularity, RawObservation};
//!
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
//! let observations = [RawObservation::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), 5)];
//!
//! let series = bucketize(&observations, 7, Granularity::Day, now);
//! assert_eq!(series.len(), 7);
//! assert_eq!(series[6].value, 5);
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, TimeDelta, TimeZone, Timelike, Utc};

use crate::error::{Error, Result};
use crate::types::{BucketPoint, BucketWindow, DuplicatePolicy, Granularity, RawObservation};

/// Build a dense series, returning an empty one if any date arithmetic fails.
///
/// Duplicates are resolved with [`DuplicatePolicy::default`].
pub fn bucketize<Tz: TimeZone>(
    observations: &[RawObservation],
    window_size: usize,
    granularity: Granularity,
    now: DateTime<Tz>,
) -> Vec<BucketPoint<Tz>> {
    bucketize_with_policy(
        observations,
        window_size,
        granularity,
        now,
        DuplicatePolicy::default(),
    )
}

/// Like [`bucketize`] with an explicit duplicate policy.
pub fn bucketize_with_policy<Tz: TimeZone>(
    observations: &[RawObservation],
    window_size: usize,
    granularity: Granularity,
    now: DateTime<Tz>,
    policy: DuplicatePolicy,
) -> Vec<BucketPoint<Tz>> {
    match try_bucketize_with_policy(observations, window_size, granularity, now, policy) {
        Ok(series) => series,
        Err(e) => {
            tracing::warn!(
                error = %e,
                granularity = %granularity,
                window_size,
                "Bucketing failed, returning empty series"
            );
            Vec::new()
        }
    }
}

/// Fallible form of [`bucketize`].
pub fn try_bucketize<Tz: TimeZone>(
    observations: &[RawObservation],
    window_size: usize,
    granularity: Granularity,
    now: DateTime<Tz>,
) -> Result<Vec<BucketPoint<Tz>>> {
    try_bucketize_with_policy(
        observations,
        window_size,
        granularity,
        now,
        DuplicatePolicy::default(),
    )
}

/// Fallible form of [`bucketize_with_policy`].
///
/// Never returns a partial series: either every bucket timestamp could be
/// computed or the whole call fails.
pub fn try_bucketize_with_policy<Tz: TimeZone>(
    observations: &[RawObservation],
    window_size: usize,
    granularity: Granularity,
    now: DateTime<Tz>,
    policy: DuplicatePolicy,
) -> Result<Vec<BucketPoint<Tz>>> {
    let window = BucketWindow {
        granularity,
        size: window_size,
    };
    let timestamps = bucket_starts(&window, &now)?;

    tracing::debug!(
        granularity = %granularity,
        window_size,
        observations = observations.len(),
        "Computed bucket window"
    );

    let tz = now.timezone();
    let mut values: HashMap<DateTime<Utc>, u64> = HashMap::with_capacity(observations.len());
    for obs in observations {
        // An observation whose own bucket cannot be computed is never inside
        // the window, since every bucket in the window was computed above.
        let Ok(key) = align(&obs.at.with_timezone(&tz), granularity) else {
            continue;
        };
        values
            .entry(key.with_timezone(&Utc))
            .and_modify(|v| *v = policy.combine(*v, obs.count))
            .or_insert(obs.count);
    }

    Ok(timestamps
        .into_iter()
        .map(|timestamp| {
            let value = values
                .get(&timestamp.with_timezone(&Utc))
                .copied()
                .unwrap_or(0);
            BucketPoint { timestamp, value }
        })
        .collect())
}

/// Start instants of every bucket in `window`, oldest first.
///
/// The last bucket is the one containing `now`.
pub fn bucket_starts<Tz: TimeZone>(
    window: &BucketWindow,
    now: &DateTime<Tz>,
) -> Result<Vec<DateTime<Tz>>> {
    if window.size == 0 {
        return Err(Error::InvalidWindow(window.size));
    }
    let back = window.size - 1;

    match window.granularity {
        Granularity::Hour => {
            let anchor = align(now, Granularity::Hour)?;
            let start = anchor
                .checked_sub_signed(hours(back)?)
                .ok_or_else(|| Error::Calendar(format!("{} hours before window anchor", back)))?;
            (0..window.size)
                .map(|i| {
                    start
                        .clone()
                        .checked_add_signed(hours(i)?)
                        .ok_or_else(|| Error::Calendar(format!("hour bucket {} out of range", i)))
                })
                .collect()
        }
        Granularity::Day => {
            let tz = now.timezone();
            let start = now
                .date_naive()
                .checked_sub_days(Days::new(back as u64))
                .ok_or_else(|| Error::Calendar(format!("{} days before window anchor", back)))?;
            (0..window.size)
                .map(|i| {
                    let date = start.checked_add_days(Days::new(i as u64)).ok_or_else(|| {
                        Error::Calendar(format!("day bucket {} out of range", i))
                    })?;
                    start_of_day(&tz, date)
                })
                .collect()
        }
    }
}

/// Truncate an instant to the start of its hour or day in its own calendar.
pub fn align<Tz: TimeZone>(instant: &DateTime<Tz>, granularity: Granularity) -> Result<DateTime<Tz>> {
    match granularity {
        Granularity::Hour => {
            let into_hour = TimeDelta::minutes(instant.minute() as i64)
                + TimeDelta::seconds(instant.second() as i64)
                + TimeDelta::nanoseconds(instant.nanosecond() as i64);
            instant
                .clone()
                .checked_sub_signed(into_hour)
                .ok_or_else(|| Error::Calendar(format!("cannot truncate {:?} to hour", instant.naive_utc())))
        }
        Granularity::Day => start_of_day(&instant.timezone(), instant.date_naive()),
    }
}

/// First instant of `date` in `tz`.
///
/// Usually local midnight. When a DST jump skips midnight the day starts
/// where the gap ends (01:00 in America/Santiago on its spring-forward day).
/// Fails only if no local time on `date` exists at all.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<DateTime<Tz>> {
    let mut candidate = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::Calendar(format!("no midnight on {}", date)))?;

    while candidate.date() == date {
        if let Some(start) = tz.from_local_datetime(&candidate).earliest() {
            return Ok(start);
        }
        candidate = candidate
            .checked_add_signed(TimeDelta::minutes(1))
            .ok_or_else(|| Error::Calendar(format!("no local time on {}", date)))?;
    }
    Err(Error::Calendar(format!("no local time on {} exists", date)))
}

fn hours(n: usize) -> Result<TimeDelta> {
    i64::try_from(n)
        .ok()
        .and_then(TimeDelta::try_hours)
        .ok_or_else(|| Error::Calendar(format!("{} hours overflows a duration", n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_align_hour() {
        let t = utc(2024, 1, 1, 13, 47) + TimeDelta::milliseconds(250);
        assert_eq!(align(&t, Granularity::Hour).unwrap(), utc(2024, 1, 1, 13, 0));
    }

    #[test]
    fn test_align_day() {
        let t = utc(2024, 3, 9, 23, 59);
        assert_eq!(align(&t, Granularity::Day).unwrap(), utc(2024, 3, 9, 0, 0));
    }

    #[test]
    fn test_align_half_hour_offset() {
        // India is UTC+05:30; local hours start at :30 UTC.
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let t = ist.with_ymd_and_hms(2024, 1, 1, 17, 47, 12).unwrap();
        let aligned = align(&t, Granularity::Hour).unwrap();
        assert_eq!(aligned, ist.with_ymd_and_hms(2024, 1, 1, 17, 0, 0).unwrap());
        assert_eq!(aligned.with_timezone(&Utc), utc(2024, 1, 1, 11, 30));
    }

    #[test]
    fn test_zero_window_is_invalid() {
        let err = bucket_starts(&BucketWindow::daily(0), &utc(2024, 1, 1, 0, 0)).unwrap_err();
        assert!(matches!(err, Error::InvalidWindow(0)));
        assert!(bucketize(&[], 0, Granularity::Day, utc(2024, 1, 1, 0, 0)).is_empty());
    }

    #[test]
    fn test_bucket_starts_cross_month() {
        let starts = bucket_starts(&BucketWindow::daily(3), &utc(2024, 3, 1, 8, 0)).unwrap();
        assert_eq!(
            starts,
            vec![utc(2024, 2, 28, 0, 0), utc(2024, 2, 29, 0, 0), utc(2024, 3, 1, 0, 0)]
        );
    }

    #[test]
    fn test_hourly_underflow_fails_whole_series() {
        let now = DateTime::<Utc>::MIN_UTC;
        let result = try_bucketize(&[], 24, Granularity::Hour, now);
        assert!(matches!(result, Err(Error::Calendar(_))));
        assert!(bucketize(&[], 24, Granularity::Hour, now).is_empty());
    }

    #[test]
    fn test_daily_underflow_fails_whole_series() {
        let now = DateTime::<Utc>::MIN_UTC;
        assert!(matches!(
            try_bucketize(&[], 30, Granularity::Day, now),
            Err(Error::Calendar(_))
        ));
        // A single-day window at the minimum date is still computable.
        assert_eq!(bucketize(&[], 1, Granularity::Day, now).len(), 1);
    }

    #[test]
    fn test_observations_outside_window_ignored() {
        let now = utc(2024, 1, 10, 12, 0);
        let observations = [
            RawObservation::new(utc(2023, 12, 1, 9, 0), 100),
            RawObservation::new(utc(2024, 1, 11, 9, 0), 100),
            RawObservation::new(utc(2024, 1, 9, 9, 0), 4),
        ];
        let series = bucketize(&observations, 7, Granularity::Day, now);
        let values: Vec<u64> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![0, 0, 0, 0, 0, 4, 0]);
    }
}
