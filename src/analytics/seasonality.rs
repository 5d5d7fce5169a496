//! Sales by calendar month and by weekday

use chrono::Datelike;
use serde::Serialize;

use super::NamedValue;
use crate::data::SalesRecord;

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Sales totals per month (Jan..Dec) and per weekday (Sun..Sat).
///
/// Months and weekdays without any record are omitted, not reported as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Seasonality {
    pub monthly: Vec<NamedValue>,
    pub weekly: Vec<NamedValue>,
}

pub fn calculate_seasonality(records: &[SalesRecord]) -> Seasonality {
    let mut monthly: [Option<f64>; 12] = [None; 12];
    let mut weekly: [Option<f64>; 7] = [None; 7];

    for record in records {
        let month = record.order_date.month0() as usize;
        let day = record.order_date.weekday().num_days_from_sunday() as usize;
        let price = record.price();

        *monthly[month].get_or_insert(0.0) += price;
        *weekly[day].get_or_insert(0.0) += price;
    }

    Seasonality {
        monthly: labelled(&monthly, &MONTH_NAMES),
        weekly: labelled(&weekly, &DAY_NAMES),
    }
}

fn labelled(totals: &[Option<f64>], names: &[&str]) -> Vec<NamedValue> {
    totals
        .iter()
        .zip(names)
        .filter_map(|(total, name)| {
            total.map(|value| NamedValue {
                name: (*name).to_string(),
                value,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::record;

    #[test]
    fn test_wednesday_in_march() {
        let seasonality = calculate_seasonality(&[record("C1", "2024-03-06", 120.0)]);
        assert_eq!(
            seasonality.monthly,
            vec![NamedValue { name: "Mar".into(), value: 120.0 }]
        );
        assert_eq!(
            seasonality.weekly,
            vec![NamedValue { name: "Wed".into(), value: 120.0 }]
        );
    }

    #[test]
    fn test_fixed_order_and_sparsity() {
        let seasonality = calculate_seasonality(&[
            record("C1", "2024-12-01", 5.0), // Sunday
            record("C2", "2023-01-07", 7.0), // Saturday
            record("C3", "2024-01-13", 3.0), // Saturday
        ]);

        let months: Vec<(&str, f64)> = seasonality
            .monthly
            .iter()
            .map(|v| (v.name.as_str(), v.value))
            .collect();
        assert_eq!(months, vec![("Jan", 10.0), ("Dec", 5.0)]);

        let days: Vec<(&str, f64)> = seasonality
            .weekly
            .iter()
            .map(|v| (v.name.as_str(), v.value))
            .collect();
        assert_eq!(days, vec![("Sun", 5.0), ("Sat", 10.0)]);
    }

    #[test]
    fn test_zero_priced_record_still_listed() {
        let seasonality = calculate_seasonality(&[record("C1", "2024-05-01", 0.0)]);
        assert_eq!(seasonality.monthly.len(), 1);
        assert_eq!(seasonality.monthly[0].value, 0.0);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(calculate_seasonality(&[]), Seasonality::default());
    }
}
