//! Z-score outlier detection over a period series

use ndarray::Array1;

use super::SeriesPoint;

/// Default number of standard deviations before a point is flagged
pub const DEFAULT_THRESHOLD: f64 = 2.0;

/// Return the points lying more than `threshold` population standard
/// deviations from the series mean, in input order.
///
/// Series shorter than three points return no anomalies.
pub fn detect_anomalies(series: &[SeriesPoint], threshold: f64) -> Vec<SeriesPoint> {
    if series.len() < 3 {
        return Vec::new();
    }

    let values: Array1<f64> = series.iter().map(|p| p.value).collect();
    let mean = values.mean().unwrap_or(0.0);
    let std_dev = values.std(0.0);
    let limit = threshold * std_dev;

    let anomalies: Vec<SeriesPoint> = series
        .iter()
        .filter(|p| (p.value - mean).abs() > limit)
        .cloned()
        .collect();

    log::debug!(
        "Anomaly scan: mean={:.2} std_dev={:.2} flagged {} of {}",
        mean,
        std_dev,
        anomalies.len(),
        series.len()
    );

    anomalies
}
