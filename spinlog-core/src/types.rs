//! Core domain types for spinlog
//!
//! These types describe the data flowing into and out of the chart series
//! builder.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Observation** | A sparse input point: an instant and a count (plays or minutes) |
//! | **Bucket** | A fixed-width time slot (one hour or one calendar day) |
//! | **Alignment** | Rounding an instant down to the start of its bucket |
//! | **Dense series** | One value per bucket, no gaps, zero where nothing was observed |

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Input
// ============================================

/// A sparse listening observation.
///
/// Produced by whatever fetched the listening history. Observations may arrive
/// in any order and any bucket may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawObservation {
    /// Instant inside the hour or day this count belongs to
    pub at: DateTime<Utc>,
    /// Play count or listened minutes
    pub count: u64,
}

impl RawObservation {
    pub fn new<Tz: TimeZone>(at: DateTime<Tz>, count: u64) -> Self {
        Self {
            at: at.with_timezone(&Utc),
            count,
        }
    }
}

// ============================================
// Output
// ============================================

/// One bucket of a dense series.
#[derive(Debug, Clone)]
pub struct BucketPoint<Tz: TimeZone> {
    /// Start of the bucket, in the calendar the series was built for
    pub timestamp: DateTime<Tz>,
    /// Aggregated magnitude for the bucket (0 when nothing was observed)
    pub value: u64,
}

// Compares instants, so the same bucket in two calendars is equal.
impl<Tz: TimeZone> PartialEq for BucketPoint<Tz> {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp && self.value == other.value
    }
}

impl<Tz: TimeZone> Eq for BucketPoint<Tz> {}

impl<Tz: TimeZone> Serialize for BucketPoint<Tz> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("BucketPoint", 2)?;
        state.serialize_field("timestamp", &self.timestamp.fixed_offset().to_rfc3339())?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}

// ============================================
// Window configuration
// ============================================

/// Width of a single bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    Day,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hour => "hour",
            Granularity::Day => "day",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How several observations that align to the same bucket are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the first observation in input order
    #[default]
    FirstWins,
    /// Keep the last observation in input order
    LastWins,
    /// Add all counts together (saturating)
    Sum,
}

impl DuplicatePolicy {
    /// Combine the value already in a bucket with a newly seen one.
    pub fn combine(&self, existing: u64, incoming: u64) -> u64 {
        match self {
            DuplicatePolicy::FirstWins => existing,
            DuplicatePolicy::LastWins => incoming,
            DuplicatePolicy::Sum => existing.saturating_add(incoming),
        }
    }
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "first_wins" | "first" => Ok(DuplicatePolicy::FirstWins),
            "last_wins" | "last" => Ok(DuplicatePolicy::LastWins),
            "sum" => Ok(DuplicatePolicy::Sum),
            other => Err(crate::Error::Config(format!(
                "unknown duplicate policy: {}",
                other
            ))),
        }
    }
}

/// Size and granularity of a bucket window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketWindow {
    pub granularity: Granularity,
    pub size: usize,
}

impl BucketWindow {
    /// The last 24 hours, ending with the current hour.
    pub fn hourly() -> Self {
        Self {
            granularity: Granularity::Hour,
            size: 24,
        }
    }

    /// The last `days` days, ending with today.
    pub fn daily(days: usize) -> Self {
        Self {
            granularity: Granularity::Day,
            size: days,
        }
    }

    /// Fixed step between hourly buckets.
    ///
    /// Daily buckets step by calendar day and have no fixed length.
    pub fn unit(&self) -> Option<chrono::Duration> {
        match self.granularity {
            Granularity::Hour => Some(chrono::Duration::hours(1)),
            Granularity::Day => None,
        }
    }
}
