//! Report assembly, export to JSON/CSV, and console summary

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::Serialize;

use crate::analytics::{
    calculate_kpis, calculate_seasonality, calculate_trends, detect_anomalies, format_growth,
    generate_forecast, sales_series, segment_counts, segment_customers, ForecastPoint, Granularity,
    Kpis, NamedValue, Seasonality, Segment, SeriesPoint, TrendBucket,
};
use crate::breakdown::{sales_by, top_n, Dimension};
use crate::data::{DataStats, SalesRecord};

/// How many prefectures the report ranks
pub const TOP_PREFECTURES: usize = 10;

/// Parameters for one analytics run
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub granularity: Granularity,
    pub anomaly_threshold: f64,
    pub forecast_periods: usize,
    /// Reference time for recency
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentCount {
    pub segment: Segment,
    pub customers: usize,
}

/// Every analytics output for one set of records
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub granularity: Granularity,
    pub data_stats: DataStats,
    pub kpis: Kpis,
    pub trends: Vec<TrendBucket>,
    pub anomalies: Vec<SeriesPoint>,
    pub forecast: Vec<ForecastPoint>,
    pub segment_counts: Vec<SegmentCount>,
    pub seasonality: Seasonality,
    pub category_sales: Vec<NamedValue>,
    pub top_prefectures: Vec<NamedValue>,
}

/// Run every analysis over `current`, comparing KPIs against `previous`
pub fn build_report(
    current: &[SalesRecord],
    previous: &[SalesRecord],
    data_stats: DataStats,
    options: &AnalysisOptions,
) -> AnalyticsReport {
    let trends = calculate_trends(current, options.granularity);
    let series = sales_series(&trends);
    let anomalies = detect_anomalies(&series, options.anomaly_threshold);
    let forecast = generate_forecast(&series, options.forecast_periods);
    let profiles = segment_customers(current, options.now);

    AnalyticsReport {
        generated_at: options.now,
        granularity: options.granularity,
        data_stats,
        kpis: calculate_kpis(current, previous),
        trends,
        anomalies,
        forecast,
        segment_counts: segment_counts(&profiles)
            .into_iter()
            .map(|(segment, customers)| SegmentCount { segment, customers })
            .collect(),
        seasonality: calculate_seasonality(current),
        category_sales: sales_by(current, Dimension::Category),
        top_prefectures: top_n(sales_by(current, Dimension::Prefecture), TOP_PREFECTURES),
    }
}

/// Write the full report as pretty-printed JSON
pub fn write_json<P: AsRef<Path>>(report: &AnalyticsReport, path: P) -> crate::Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("failed to create report file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

/// Convert trend buckets into a DataFrame for export
pub fn trends_frame(trends: &[TrendBucket]) -> crate::Result<DataFrame> {
    let periods: Vec<&str> = trends.iter().map(|t| t.period.as_str()).collect();
    let sales: Vec<f64> = trends.iter().map(|t| t.sales).collect();
    let orders: Vec<u32> = trends.iter().map(|t| t.orders).collect();
    let customers: Vec<u32> = trends.iter().map(|t| t.customers).collect();
    let avg_order_value: Vec<f64> = trends.iter().map(|t| t.avg_order_value).collect();

    let df = df!(
        "period" => periods,
        "sales" => sales,
        "orders" => orders,
        "customers" => customers,
        "avg_order_value" => avg_order_value
    )?;
    Ok(df)
}

/// Write trend buckets as CSV
pub fn write_trends_csv<P: AsRef<Path>>(trends: &[TrendBucket], path: P) -> crate::Result<()> {
    let path = path.as_ref();
    let mut df = trends_frame(trends)?;
    let mut file = File::create(path)
        .with_context(|| format!("failed to create trends file {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("failed to write trends to {}", path.display()))?;
    Ok(())
}

/// Print a human-readable summary of the report
pub fn print_summary(report: &AnalyticsReport) {
    let stats = &report.data_stats;
    println!("=== Sales Analytics Report ===");
    println!(
        "Generated: {}",
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "Rows: {} valid / {} total ({:.2}% valid)\n",
        stats.valid_rows, stats.total_rows, stats.validation_rate
    );

    println!("=== KPIs ===");
    let kpis = &report.kpis;
    for (name, metric) in [
        ("Total sales", &kpis.total_sales),
        ("Orders", &kpis.total_orders),
        ("Customers", &kpis.unique_customers),
        ("Avg order value", &kpis.avg_order_value),
    ] {
        println!(
            "{:<16} {:>16}  ({} vs prior period)",
            name,
            metric.formatted,
            format_growth(metric.growth)
        );
    }

    println!("\n=== Trends ({}) ===", report.granularity);
    let recent = report.trends.len().saturating_sub(6);
    for trend in &report.trends[recent..] {
        println!(
            "{:<12} sales {:>14.0}  orders {:>6}  customers {:>6}",
            trend.period, trend.sales, trend.orders, trend.customers
        );
    }

    if report.anomalies.is_empty() {
        println!("\n✓ No anomalies detected");
    } else {
        println!("\n=== Anomalies ===");
        for anomaly in &report.anomalies {
            println!("{:<12} {:>14.0}", anomaly.period, anomaly.value);
        }
    }

    if !report.forecast.is_empty() {
        println!("\n=== Forecast ===");
        for point in &report.forecast {
            println!(
                "period {:<5} {:>14.0}  (confidence {:.0}%)",
                point.period,
                point.value,
                point.confidence * 100.0
            );
        }
    }

    println!("\n=== Customer Segments ===");
    for count in report.segment_counts.iter().filter(|c| c.customers > 0) {
        println!("{:<20} {}", count.segment.label(), count.customers);
    }

    println!("\n=== Top Prefectures ===");
    for value in &report.top_prefectures {
        println!("{:<16} {:>14.0}", value.name, value.value);
    }
}
