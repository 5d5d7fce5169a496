//! Least-squares trend extrapolation

use ndarray::Array1;
use serde::Serialize;

use super::SeriesPoint;

/// Default number of periods to project
pub const DEFAULT_PERIODS: usize = 6;

const MAX_CONFIDENCE: f64 = 0.9;
const MIN_CONFIDENCE: f64 = 0.3;
const CONFIDENCE_DECAY: f64 = 0.1;

/// A projected value for a future period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    /// 1-based index continuing the input series
    pub period: usize,
    /// Never negative
    pub value: f64,
    /// In `[0.3, 0.9]`, decaying with distance from the data
    pub confidence: f64,
}

/// Fit `value = slope * i + intercept` over `i = 0..n` and return (slope, intercept)
fn fit_line(values: &Array1<f64>) -> (f64, f64) {
    let n = values.len() as f64;
    let index = Array1::range(0.0, n, 1.0);

    let sum_x = index.sum();
    let sum_y = values.sum();
    let sum_xy = index.dot(values);
    let sum_xx = index.dot(&index);

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return (0.0, if n > 0.0 { sum_y / n } else { 0.0 });
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    (slope, intercept)
}

/// Project `periods` future values from a chronological series.
///
/// Series shorter than three points produce no forecast.
pub fn generate_forecast(series: &[SeriesPoint], periods: usize) -> Vec<ForecastPoint> {
    if series.len() < 3 {
        return Vec::new();
    }

    let values: Array1<f64> = series.iter().map(|p| p.value).collect();
    let n = values.len();
    let (slope, intercept) = fit_line(&values);

    log::debug!(
        "Forecast fit over {} points: slope={:.4} intercept={:.4}",
        n,
        slope,
        intercept
    );

    (0..periods)
        .map(|k| ForecastPoint {
            period: n + k + 1,
            value: (slope * (n + k) as f64 + intercept).max(0.0),
            confidence: (MAX_CONFIDENCE - CONFIDENCE_DECAY * k as f64).max(MIN_CONFIDENCE),
        })
        .collect()
}
