//! Record selection by region, category and trailing date window

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};

use crate::data::SalesRecord;

/// Trailing window ending at the reference time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    #[default]
    All,
    Last30Days,
    Last90Days,
    LastYear,
}

impl DateRange {
    /// Inclusive start of the window, or `None` for an unbounded range
    pub fn start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DateRange::All => None,
            DateRange::Last30Days => Some(now - Duration::days(30)),
            DateRange::Last90Days => Some(now - Duration::days(90)),
            DateRange::LastYear => now.checked_sub_months(Months::new(12)),
        }
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(DateRange::All),
            "30days" => Ok(DateRange::Last30Days),
            "90days" => Ok(DateRange::Last90Days),
            "1year" => Ok(DateRange::LastYear),
            other => Err(format!(
                "unknown date range '{other}' (expected all, 30days, 90days or 1year)"
            )),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DateRange::All => "all",
            DateRange::Last30Days => "30days",
            DateRange::Last90Days => "90days",
            DateRange::LastYear => "1year",
        };
        f.write_str(name)
    }
}

/// Criteria applied before the analytics run; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub prefecture: Option<String>,
    pub category: Option<String>,
    pub date_range: DateRange,
}

impl RecordFilter {
    fn matches_labels(&self, record: &SalesRecord) -> bool {
        self.prefecture
            .as_deref()
            .is_none_or(|p| record.prefecture == p)
            && self
                .category
                .as_deref()
                .is_none_or(|c| record.category == c)
    }

    /// Records matching every criterion within the current window
    pub fn apply(&self, records: &[SalesRecord], now: DateTime<Utc>) -> Vec<SalesRecord> {
        let start = self.date_range.start(now);
        records
            .iter()
            .filter(|r| self.matches_labels(r))
            .filter(|r| start.is_none_or(|s| r.order_date >= s))
            .cloned()
            .collect()
    }

    /// Records matching the label criteria in the window of equal length
    /// immediately before the current one. Empty for an unbounded range.
    pub fn apply_previous(&self, records: &[SalesRecord], now: DateTime<Utc>) -> Vec<SalesRecord> {
        let Some(start) = self.date_range.start(now) else {
            return Vec::new();
        };
        let previous_start = start - (now - start);
        records
            .iter()
            .filter(|r| self.matches_labels(r))
            .filter(|r| r.order_date >= previous_start && r.order_date < start)
            .cloned()
            .collect()
    }
}
