//! Analytics module for spinlog
//!
//! Shapes listening history for display:
//! - [`series`]: calendar bucketing of sparse observations into dense series
//! - [`charts`]: hourly listening and daily trend bar chart models

pub mod charts;
pub mod series;

pub use charts::{
    BarChart, ChartBar, ChartOptions, DailyTrendChart, HourlyListeningChart, DAILY_WINDOW,
    HOURLY_WINDOW,
};
pub use series::{
    align, bucket_starts, bucketize, bucketize_with_policy, try_bucketize,
    try_bucketize_with_policy,
};
