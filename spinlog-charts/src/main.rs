//! spinlog-charts - listening charts in the terminal
//!
//! Reads listening observations as JSON and prints the hourly listening or
//! daily trend series the stats screen would draw.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use clap::{Parser, ValueEnum};
use spinlog_core::analytics::{BarChart, ChartBar, ChartOptions, DailyTrendChart, HourlyListeningChart};
use spinlog_core::config::ClockZone;
use spinlog_core::format::{format_count, format_minutes};
use spinlog_core::{Config, DuplicatePolicy, Granularity, RawObservation};

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ChartKind {
    /// Listening per hour, last 24 hours
    Hourly,
    /// Listening per day, last N days
    Daily,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Unit {
    Plays,
    Minutes,
}

#[derive(Parser, Debug)]
#[command(name = "spinlog-charts")]
#[command(about = "Listening charts from play history")]
#[command(version)]
struct Args {
    /// Which chart to build
    #[arg(value_enum)]
    chart: ChartKind,

    /// JSON file with observations (default: stdin)
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Number of days for the daily chart (default: from config)
    #[arg(long)]
    days: Option<usize>,

    /// Number of hourly bars (default: from config)
    #[arg(long)]
    window: Option<usize>,

    /// Current time as RFC 3339 (default: system clock)
    #[arg(long)]
    now: Option<String>,

    /// How observations in the same bucket combine (first-wins, last-wins, sum)
    #[arg(long)]
    policy: Option<String>,

    /// Align buckets to UTC instead of the configured zone
    #[arg(long)]
    utc: bool,

    /// What the counts measure
    #[arg(long, value_enum, default_value = "plays")]
    unit: Unit,

    /// Export format (json)
    #[arg(long)]
    export: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = spinlog_core::logging::init(&config.logging).ok();

    let observations = read_observations(args.input.as_ref())?;
    tracing::info!(
        count = observations.len(),
        chart = ?args.chart,
        "Loaded observations"
    );

    let mut options = match args.chart {
        ChartKind::Hourly => config.charts.hourly_options(),
        ChartKind::Daily => config.charts.daily_options(),
    };
    match args.chart {
        ChartKind::Hourly => {
            if let Some(window) = args.window {
                options.window_size = window;
            }
        }
        ChartKind::Daily => {
            if let Some(days) = args.days {
                options.window_size = days;
            }
        }
    }
    if let Some(policy) = &args.policy {
        options.policy = policy
            .parse::<DuplicatePolicy>()
            .context("invalid --policy")?;
    }
    if options.window_size == 0 {
        anyhow::bail!("Window must have at least one bar");
    }

    let now = match &args.now {
        Some(s) => Some(
            DateTime::parse_from_rfc3339(s)
                .with_context(|| format!("Invalid --now timestamp: {}", s))?,
        ),
        None => None,
    };

    let zone = if args.utc {
        ClockZone::Utc
    } else {
        config.charts.timezone
    };
    match zone {
        ClockZone::Utc => render(&args, &observations, &options, clock(now, &Utc)),
        ClockZone::Local => render(&args, &observations, &options, clock(now, &Local)),
    }
}

/// The `--now` override in `tz`, or the system clock.
fn clock<Tz: TimeZone>(now: Option<DateTime<FixedOffset>>, tz: &Tz) -> DateTime<Tz> {
    match now {
        Some(now) => now.with_timezone(tz),
        None => Utc::now().with_timezone(tz),
    }
}

fn read_observations(path: Option<&PathBuf>) -> Result<Vec<RawObservation>> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("failed to parse observations")
}

fn render<Tz>(
    args: &Args,
    observations: &[RawObservation],
    options: &ChartOptions,
    now: DateTime<Tz>,
) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let (granularity, title, bars, total, peak) = match args.chart {
        ChartKind::Hourly => {
            let chart = HourlyListeningChart::build_with(observations, now, options);
            (
                Granularity::Hour,
                "LISTENING BY HOUR".to_string(),
                chart.bars().to_vec(),
                chart.total(),
                chart.peak().map(|b| b.label.clone()),
            )
        }
        ChartKind::Daily => {
            let chart = DailyTrendChart::build_with(observations, now, options);
            (
                Granularity::Day,
                format!("LAST {} DAYS", options.window_size),
                chart.bars().to_vec(),
                chart.total(),
                chart.peak().map(|b| b.label.clone()),
            )
        }
    };

    match args.export.as_deref() {
        Some("json") => print_json(granularity, args.unit, &bars, total, peak.as_deref()),
        Some(other) => anyhow::bail!("Unknown export format: {}. Use 'json'", other),
        None => {
            print_terminal(&title, args.unit, &bars, total, peak.as_deref());
            Ok(())
        }
    }
}

fn format_value(unit: Unit, value: u64) -> String {
    match unit {
        Unit::Plays => format_count(value),
        Unit::Minutes => format_minutes(value),
    }
}

fn print_terminal<Tz: TimeZone>(
    title: &str,
    unit: Unit,
    bars: &[ChartBar<Tz>],
    total: u64,
    peak: Option<&str>,
) {
    println!();
    println!("{}", title);
    println!("{}", "─".repeat(title.chars().count()));

    if bars.is_empty() {
        println!("  No data.");
        println!();
        return;
    }

    for bar in bars {
        let width = (bar.height * BAR_WIDTH as f64).round() as usize;
        println!(
            "  {:>6} │{:<width$} {}",
            bar.label,
            "█".repeat(width),
            format_value(unit, bar.point.value),
            width = BAR_WIDTH
        );
    }
    println!();
    println!("  Total: {}", format_value(unit, total));
    match peak {
        Some(label) => println!("  Peak:  {}", label),
        None => println!("  Peak:  -"),
    }
    println!();
}

fn print_json<Tz: TimeZone>(
    granularity: Granularity,
    unit: Unit,
    bars: &[ChartBar<Tz>],
    total: u64,
    peak: Option<&str>,
) -> Result<()> {
    let json = serde_json::json!({
        "granularity": granularity,
        "unit": match unit {
            Unit::Plays => "plays",
            Unit::Minutes => "minutes",
        },
        "total": total,
        "peak": peak,
        "points": bars,
    });

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
