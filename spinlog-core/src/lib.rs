//! # spinlog-core
//!
//! Core library for spinlog - listening statistics for the music app's
//! stats screen.
//!
//! This library provides:
//! - Domain types for sparse observations and dense chart series
//! - Calendar bucketing of observations into hourly and daily series
//! - Chart models for the hourly listening and daily trend bar graphs
//! - Display formatting for minutes, counts and axis labels
//! - Cache TTLs for fetched data
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use spinlog_core::analytics::{BarChart, HourlyListeningChart};
//! use spinlog_core::RawObservation;
//!
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 13, 47, 0).unwrap();
//! let plays = [RawObservation::new(Utc.with_ymd_and_hms(2024, 1, 1, 13, 5, 0).unwrap(), 12)];
//!
//! let chart = HourlyListeningChart::build(&plays, now);
//! assert_eq!(chart.bars().len(), 24);
//! assert_eq!(chart.peak().map(|b| b.label.as_str()), Some("1PM"));
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod analytics;
pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod types;
