//! Salespulse: sales analytics over a CSV feed
//!
//! The [`analytics`] module is a set of pure functions turning validated sales
//! records into trends, KPIs, anomaly flags, forecasts, RFM customer segments
//! and seasonality. The remaining modules load and filter records and export
//! the results.

pub mod analytics;
pub mod breakdown;
pub mod cli;
pub mod data;
pub mod filter;
pub mod report;

// Re-export public items for easier access
pub use analytics::{
    calculate_growth_rate, calculate_kpis, calculate_seasonality, calculate_trends,
    customer_segment, detect_anomalies, generate_forecast, segment_customers, Granularity,
    SeriesPoint,
};
pub use cli::Args;
pub use data::{load_sales_file, parse_sales_csv, IngestReport, SalesRecord};
pub use filter::{DateRange, RecordFilter};
pub use report::{build_report, AnalysisOptions, AnalyticsReport};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
