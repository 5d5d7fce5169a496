//! Period aggregation of sales into calendar buckets

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;

use super::SeriesPoint;
use crate::data::SalesRecord;

/// Calendar bucket size for trend aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    /// Weeks start on Sunday
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl Granularity {
    /// Bucket key for a timestamp. Keys are zero-padded so that string
    /// order matches chronological order.
    pub fn period_key(&self, date: &DateTime<Utc>) -> String {
        let date = date.date_naive();
        match self {
            Granularity::Daily => format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day()),
            Granularity::Weekly => {
                let start =
                    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()));
                format!("{:04}-{:02}-{:02}", start.year(), start.month(), start.day())
            }
            Granularity::Monthly => format!("{:04}-{:02}", date.year(), date.month()),
            Granularity::Yearly => format!("{:04}", date.year()),
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Granularity::Daily),
            "weekly" => Ok(Granularity::Weekly),
            "monthly" => Ok(Granularity::Monthly),
            "yearly" => Ok(Granularity::Yearly),
            other => Err(format!(
                "unknown granularity '{other}' (expected daily, weekly, monthly or yearly)"
            )),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
            Granularity::Yearly => "yearly",
        };
        f.write_str(name)
    }
}

/// Aggregated metrics for one period
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendBucket {
    pub period: String,
    pub sales: f64,
    pub orders: u32,
    /// Distinct customers in the period
    pub customers: u32,
    pub avg_order_value: f64,
}

#[derive(Default)]
struct Accumulator<'a> {
    sales: f64,
    orders: u32,
    customers: HashSet<&'a str>,
}

/// Group records into period buckets, ascending by period key
pub fn calculate_trends(records: &[SalesRecord], granularity: Granularity) -> Vec<TrendBucket> {
    let mut grouped: BTreeMap<String, Accumulator<'_>> = BTreeMap::new();

    for record in records {
        let acc = grouped
            .entry(granularity.period_key(&record.order_date))
            .or_default();
        acc.sales += record.price();
        acc.orders += 1;
        acc.customers.insert(record.customer_id.as_str());
    }

    log::trace!(
        "Aggregated {} records into {} {} buckets",
        records.len(),
        grouped.len(),
        granularity
    );

    grouped
        .into_iter()
        .map(|(period, acc)| TrendBucket {
            period,
            sales: acc.sales,
            orders: acc.orders,
            customers: acc.customers.len() as u32,
            avg_order_value: if acc.orders > 0 {
                acc.sales / f64::from(acc.orders)
            } else {
                0.0
            },
        })
        .collect()
}

/// Project trend buckets onto their sales totals
pub fn sales_series(trends: &[TrendBucket]) -> Vec<SeriesPoint> {
    trends
        .iter()
        .map(|t| SeriesPoint::new(t.period.clone(), t.sales))
        .collect()
}
