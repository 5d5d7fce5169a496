//! Analytics core: pure functions over validated sales records
//!
//! Nothing here performs I/O or reads the clock; callers pass the reference
//! time where one is needed. Empty or undersized inputs yield empty or zeroed
//! results rather than errors.

pub mod anomaly;
pub mod forecast;
pub mod kpi;
pub mod seasonality;
pub mod segment;
pub mod trends;

use serde::Serialize;

pub use anomaly::detect_anomalies;
pub use forecast::{generate_forecast, ForecastPoint};
pub use kpi::{calculate_growth_rate, calculate_kpis, format_growth, format_number, KpiMetric, Kpis};
pub use seasonality::{calculate_seasonality, Seasonality};
pub use segment::{
    customer_segment, segment_counts, segment_customers, CustomerProfile, RfmThresholds, Segment,
};
pub use trends::{calculate_trends, sales_series, Granularity, TrendBucket};

/// A labelled value in an ordered series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub period: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(period: impl Into<String>, value: f64) -> Self {
        Self {
            period: period.into(),
            value,
        }
    }
}

/// A named total, e.g. sales for one month or one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}
