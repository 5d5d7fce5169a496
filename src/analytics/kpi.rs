//! Headline KPIs with growth against a prior period

use std::collections::HashSet;

use serde::Serialize;

use crate::data::SalesRecord;

const CURRENCY_PREFIX: &str = "¥";

/// One KPI value with its growth and display string
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiMetric {
    pub value: f64,
    /// Percent change from the prior period
    pub growth: f64,
    pub formatted: String,
}

/// The four dashboard KPIs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_sales: KpiMetric,
    pub total_orders: KpiMetric,
    pub unique_customers: KpiMetric,
    pub avg_order_value: KpiMetric,
}

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    sales: f64,
    orders: usize,
    customers: usize,
    avg_order_value: f64,
}

impl Totals {
    fn of(records: &[SalesRecord]) -> Self {
        let sales: f64 = records.iter().map(SalesRecord::price).sum();
        let orders = records.len();
        let customers = records
            .iter()
            .map(|r| r.customer_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        let avg_order_value = if orders > 0 {
            sales / orders as f64
        } else {
            0.0
        };
        Self {
            sales,
            orders,
            customers,
            avg_order_value,
        }
    }
}

/// Percent growth from `previous` to `current`.
///
/// A zero baseline yields 100 when `current` is positive and 0 otherwise.
pub fn calculate_growth_rate(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    (current - previous) / previous * 100.0
}

/// Compute KPIs for `current` with growth relative to `previous`
pub fn calculate_kpis(current: &[SalesRecord], previous: &[SalesRecord]) -> Kpis {
    let now = Totals::of(current);
    let prev = Totals::of(previous);

    log::debug!(
        "KPIs over {} records (prior period: {} records)",
        current.len(),
        previous.len()
    );

    Kpis {
        total_sales: KpiMetric {
            value: now.sales,
            growth: calculate_growth_rate(now.sales, prev.sales),
            formatted: format!("{CURRENCY_PREFIX}{}", format_number(now.sales)),
        },
        total_orders: KpiMetric {
            value: now.orders as f64,
            growth: calculate_growth_rate(now.orders as f64, prev.orders as f64),
            formatted: format_number(now.orders as f64),
        },
        unique_customers: KpiMetric {
            value: now.customers as f64,
            growth: calculate_growth_rate(now.customers as f64, prev.customers as f64),
            formatted: format_number(now.customers as f64),
        },
        avg_order_value: KpiMetric {
            value: now.avg_order_value,
            growth: calculate_growth_rate(now.avg_order_value, prev.avg_order_value),
            formatted: format!(
                "{CURRENCY_PREFIX}{}",
                format_number(now.avg_order_value.round())
            ),
        },
    }
}

/// Format with thousands separators and at most three fraction digits
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && (int_part != "0" || !frac_part.is_empty());
    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

/// Signed one-decimal percentage, e.g. `+12.5%`
pub fn format_growth(growth: f64) -> String {
    if growth >= 0.0 {
        format!("+{growth:.1}%")
    } else {
        format!("{growth:.1}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::record;

    #[test]
    fn test_growth_rate() {
        assert_eq!(calculate_growth_rate(0.0, 0.0), 0.0);
        assert_eq!(calculate_growth_rate(5.0, 0.0), 100.0);
        assert_eq!(calculate_growth_rate(150.0, 100.0), 50.0);
        assert_eq!(calculate_growth_rate(50.0, 100.0), -50.0);
        assert_eq!(calculate_growth_rate(-1.0, 0.0), 0.0);
    }

    #[test]
    fn test_kpis_with_previous_period() {
        let current = vec![
            record("C1", "2024-02-01", 1000.0),
            record("C2", "2024-02-02", 2000.0),
            record("C1", "2024-02-03", 3000.0),
        ];
        let previous = vec![
            record("C1", "2024-01-01", 2000.0),
            record("C3", "2024-01-02", 2000.0),
        ];

        let kpis = calculate_kpis(&current, &previous);

        assert_eq!(kpis.total_sales.value, 6000.0);
        assert_eq!(kpis.total_sales.growth, 50.0);
        assert_eq!(kpis.total_sales.formatted, "¥6,000");

        assert_eq!(kpis.total_orders.value, 3.0);
        assert_eq!(kpis.total_orders.growth, 50.0);
        assert_eq!(kpis.total_orders.formatted, "3");

        assert_eq!(kpis.unique_customers.value, 2.0);
        assert_eq!(kpis.unique_customers.growth, 0.0);

        assert_eq!(kpis.avg_order_value.value, 2000.0);
        assert_eq!(kpis.avg_order_value.growth, 0.0);
        assert_eq!(kpis.avg_order_value.formatted, "¥2,000");
    }

    #[test]
    fn test_kpis_empty_input_is_zeroed() {
        let kpis = calculate_kpis(&[], &[]);
        for metric in [
            &kpis.total_sales,
            &kpis.total_orders,
            &kpis.unique_customers,
            &kpis.avg_order_value,
        ] {
            assert_eq!(metric.value, 0.0);
            assert_eq!(metric.growth, 0.0);
        }
        assert_eq!(kpis.total_sales.formatted, "¥0");
    }

    #[test]
    fn test_kpis_without_previous_period() {
        let kpis = calculate_kpis(&[record("C1", "2024-02-01", 333.0)], &[]);
        assert_eq!(kpis.total_sales.growth, 100.0);
        assert_eq!(kpis.unique_customers.growth, 100.0);
    }

    #[test]
    fn test_avg_order_value_is_rounded_for_display() {
        let kpis = calculate_kpis(
            &[record("C1", "2024-02-01", 1000.0), record("C2", "2024-02-01", 1001.0)],
            &[],
        );
        assert_eq!(kpis.avg_order_value.value, 1000.5);
        assert_eq!(kpis.avg_order_value.formatted, "¥1,001");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1000.5), "1,000.5");
        assert_eq!(format_number(1234567.891), "1,234,567.891");
        assert_eq!(format_number(0.12345), "0.123");
        assert_eq!(format_number(-98765.4321), "-98,765.432");
        assert_eq!(format_number(-0.0001), "0");
        assert_eq!(format_number(f64::NAN), "0");
    }

    #[test]
    fn test_format_growth() {
        assert_eq!(format_growth(12.345), "+12.3%");
        assert_eq!(format_growth(0.0), "+0.0%");
        assert_eq!(format_growth(-4.0), "-4.0%");
    }
}
