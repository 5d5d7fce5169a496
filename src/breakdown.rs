//! Sales totals per categorical dimension

use std::collections::HashMap;

use crate::analytics::NamedValue;
use crate::data::SalesRecord;

/// Categorical field to group sales by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Category,
    Prefecture,
    AgeRange,
}

impl Dimension {
    fn label<'a>(&self, record: &'a SalesRecord) -> &'a str {
        match self {
            Dimension::Category => &record.category,
            Dimension::Prefecture => &record.prefecture,
            Dimension::AgeRange => &record.age_range,
        }
    }
}

/// Sum sales per label, largest first (ties broken by label)
pub fn sales_by(records: &[SalesRecord], dimension: Dimension) -> Vec<NamedValue> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for record in records {
        *totals.entry(dimension.label(record)).or_insert(0.0) += record.price();
    }

    let mut values: Vec<NamedValue> = totals
        .into_iter()
        .map(|(name, value)| NamedValue {
            name: name.to_string(),
            value,
        })
        .collect();
    values.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    values
}

/// Keep the first `n` entries of a ranked breakdown
pub fn top_n(mut values: Vec<NamedValue>, n: usize) -> Vec<NamedValue> {
    values.truncate(n);
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::record;

    fn sample() -> Vec<SalesRecord> {
        let mut records = vec![
            record("C1", "2024-01-01", 100.0),
            record("C2", "2024-01-02", 300.0),
            record("C3", "2024-01-03", 200.0),
            record("C4", "2024-01-04", 200.0),
        ];
        records[1].category = "Food".into();
        records[1].prefecture = "Osaka".into();
        records[2].prefecture = "Kyoto".into();
        records[3].prefecture = "Aichi".into();
        records
    }

    #[test]
    fn test_sales_by_category() {
        let values = sales_by(&sample(), Dimension::Category);
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].name, "Books");
        assert_eq!(values[0].value, 500.0);
        assert_eq!(values[1].name, "Food");
    }

    #[test]
    fn test_ties_ordered_by_name() {
        let values = sales_by(&sample(), Dimension::Prefecture);
        let names: Vec<&str> = values.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Osaka", "Aichi", "Kyoto", "Tokyo"]);
    }

    #[test]
    fn test_top_n() {
        let values = top_n(sales_by(&sample(), Dimension::Prefecture), 2);
        assert_eq!(values.len(), 2);
        assert!(top_n(Vec::new(), 10).is_empty());
    }

    #[test]
    fn test_age_range() {
        let values = sales_by(&sample(), Dimension::AgeRange);
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].value, 800.0);
    }
}
