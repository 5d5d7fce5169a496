//! Command-line interface definitions and argument parsing

use chrono::{DateTime, Utc};
use clap::Parser;

use crate::analytics::Granularity;
use crate::data::parse_order_date;
use crate::filter::{DateRange, RecordFilter};
use crate::report::AnalysisOptions;

/// Sales analytics over a CSV feed: KPIs, trends, anomalies, forecasts and RFM segments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input sales CSV file
    #[arg(short, long, default_value = "sales_data.csv")]
    pub input: String,

    /// Trend bucket size: daily, weekly, monthly or yearly
    #[arg(short, long, default_value = "monthly")]
    pub granularity: Granularity,

    /// Standard deviations from the mean before a period is flagged
    #[arg(long, default_value = "2.0")]
    pub threshold: f64,

    /// Number of future periods to forecast
    #[arg(long, default_value = "6")]
    pub forecast_periods: usize,

    /// Reference time for recency and date windows (RFC 3339 or YYYY-MM-DD).
    /// Defaults to the current time
    #[arg(long)]
    pub as_of: Option<String>,

    /// Only include orders from this prefecture
    #[arg(long)]
    pub prefecture: Option<String>,

    /// Only include orders in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Trailing date window: all, 30days, 90days or 1year
    #[arg(long, default_value = "all")]
    pub range: DateRange,

    /// Write the full report as JSON to this path
    #[arg(long)]
    pub json: Option<String>,

    /// Write the trend table as CSV to this path
    #[arg(long)]
    pub trends_csv: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Resolve the reference time, reading the clock only when `--as-of` is absent
    pub fn reference_time(&self) -> crate::Result<DateTime<Utc>> {
        match self.as_of.as_deref() {
            Some(value) => parse_order_date(value)
                .ok_or_else(|| anyhow::anyhow!("Invalid --as-of value: {}", value)),
            None => Ok(Utc::now()),
        }
    }

    pub fn record_filter(&self) -> RecordFilter {
        RecordFilter {
            prefecture: self.prefecture.clone(),
            category: self.category.clone(),
            date_range: self.range,
        }
    }

    pub fn analysis_options(&self, now: DateTime<Utc>) -> crate::Result<AnalysisOptions> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            anyhow::bail!("Anomaly threshold must be a positive number, got {}", self.threshold);
        }
        Ok(AnalysisOptions {
            granularity: self.granularity,
            anomaly_threshold: self.threshold,
            forecast_periods: self.forecast_periods,
            now,
        })
    }
}
