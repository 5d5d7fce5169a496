//! RFM customer profiling and percentile-threshold segmentation

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::data::SalesRecord;

const MS_PER_DAY: i64 = 86_400_000;

/// Fraction of the ranked customers used to place each RFM threshold
const THRESHOLD_QUANTILE: f64 = 0.33;

/// Customer segment from the high-value / frequent / recent decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Champions,
    LoyalCustomers,
    PotentialLoyalists,
    AtRisk,
    NewCustomers,
    Promising,
    NeedAttention,
    CannotLoseThem,
}

impl Segment {
    /// All segments in decision-table order
    pub const ALL: [Segment; 8] = [
        Segment::Champions,
        Segment::LoyalCustomers,
        Segment::PotentialLoyalists,
        Segment::AtRisk,
        Segment::NewCustomers,
        Segment::Promising,
        Segment::NeedAttention,
        Segment::CannotLoseThem,
    ];

    pub fn classify(high_value: bool, frequent: bool, recent: bool) -> Self {
        match (high_value, frequent, recent) {
            (true, true, true) => Segment::Champions,
            (true, true, false) => Segment::LoyalCustomers,
            (true, false, true) => Segment::PotentialLoyalists,
            (true, false, false) => Segment::AtRisk,
            (false, true, true) => Segment::NewCustomers,
            (false, true, false) => Segment::Promising,
            (false, false, true) => Segment::NeedAttention,
            (false, false, false) => Segment::CannotLoseThem,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Segment::Champions => "Champions",
            Segment::LoyalCustomers => "Loyal Customers",
            Segment::PotentialLoyalists => "Potential Loyalists",
            Segment::AtRisk => "At Risk",
            Segment::NewCustomers => "New Customers",
            Segment::Promising => "Promising",
            Segment::NeedAttention => "Need Attention",
            Segment::CannotLoseThem => "Cannot Lose Them",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Segment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Per-customer RFM statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub customer_id: String,
    pub total_spent: f64,
    pub order_count: u32,
    pub first_order: DateTime<Utc>,
    pub last_order: DateTime<Utc>,
    pub avg_order_value: f64,
    /// Whole days between the last order and the reference time
    pub days_since_last_order: i64,
    pub segment: Segment,
}

/// Monetary, frequency and recency cut-offs for segmentation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RfmThresholds {
    pub monetary: f64,
    pub frequency: u32,
    pub recency: i64,
}

impl RfmThresholds {
    /// Take the value at index `floor(0.33 * N)` of each ranked list:
    /// spend and order count descending, recency ascending.
    /// Returns `None` when there are no customers.
    pub fn from_profiles(profiles: &[CustomerProfile]) -> Option<Self> {
        if profiles.is_empty() {
            return None;
        }
        let idx = (profiles.len() as f64 * THRESHOLD_QUANTILE).floor() as usize;

        let mut spent: Vec<f64> = profiles.iter().map(|p| p.total_spent).collect();
        spent.sort_by(|a, b| b.total_cmp(a));

        let mut orders: Vec<u32> = profiles.iter().map(|p| p.order_count).collect();
        orders.sort_unstable_by(|a, b| b.cmp(a));

        let mut recency: Vec<i64> = profiles.iter().map(|p| p.days_since_last_order).collect();
        recency.sort_unstable();

        Some(Self {
            monetary: spent[idx],
            frequency: orders[idx],
            recency: recency[idx],
        })
    }
}

/// Segment for a single customer given the population thresholds
pub fn customer_segment(profile: &CustomerProfile, thresholds: &RfmThresholds) -> Segment {
    Segment::classify(
        profile.total_spent >= thresholds.monetary,
        profile.order_count >= thresholds.frequency,
        profile.days_since_last_order <= thresholds.recency,
    )
}

/// Build one profile per customer, in order of first appearance, and assign segments
pub fn segment_customers(records: &[SalesRecord], now: DateTime<Utc>) -> Vec<CustomerProfile> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut profiles: Vec<CustomerProfile> = Vec::new();

    for record in records {
        let slot = *index.entry(record.customer_id.as_str()).or_insert_with(|| {
            profiles.push(CustomerProfile {
                customer_id: record.customer_id.clone(),
                total_spent: 0.0,
                order_count: 0,
                first_order: record.order_date,
                last_order: record.order_date,
                avg_order_value: 0.0,
                days_since_last_order: 0,
                segment: Segment::CannotLoseThem,
            });
            profiles.len() - 1
        });

        let profile = &mut profiles[slot];
        profile.total_spent += record.price();
        profile.order_count += 1;
        profile.first_order = profile.first_order.min(record.order_date);
        profile.last_order = profile.last_order.max(record.order_date);
    }

    for profile in &mut profiles {
        profile.avg_order_value = if profile.order_count > 0 {
            profile.total_spent / f64::from(profile.order_count)
        } else {
            0.0
        };
        profile.days_since_last_order =
            (now - profile.last_order).num_milliseconds().div_euclid(MS_PER_DAY);
    }

    let Some(thresholds) = RfmThresholds::from_profiles(&profiles) else {
        return profiles;
    };
    log::debug!(
        "RFM thresholds over {} customers: monetary={:.2} frequency={} recency={}d",
        profiles.len(),
        thresholds.monetary,
        thresholds.frequency,
        thresholds.recency
    );

    for profile in &mut profiles {
        profile.segment = customer_segment(profile, &thresholds);
    }
    profiles
}

/// Count customers per segment, in decision-table order, zeros included
pub fn segment_counts(profiles: &[CustomerProfile]) -> Vec<(Segment, usize)> {
    Segment::ALL
        .iter()
        .map(|&segment| {
            let count = profiles.iter().filter(|p| p.segment == segment).count();
            (segment, count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::record;
    use crate::data::parse_order_date;

    fn now() -> DateTime<Utc> {
        parse_order_date("2024-06-30T12:00:00Z").unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert!(segment_customers(&[], now()).is_empty());
        assert!(RfmThresholds::from_profiles(&[]).is_none());
    }

    #[test]
    fn test_single_customer() {
        let profiles = segment_customers(
            &[
                record("C1", "2024-06-01", 100.0),
                record("C1", "2024-06-20", 300.0),
            ],
            now(),
        );
        assert_eq!(profiles.len(), 1);

        let p = &profiles[0];
        assert_eq!(p.customer_id, "C1");
        assert_eq!(p.total_spent, 400.0);
        assert_eq!(p.order_count, 2);
        assert_eq!(p.avg_order_value, 200.0);
        assert_eq!(p.first_order, parse_order_date("2024-06-01").unwrap());
        assert_eq!(p.last_order, parse_order_date("2024-06-20").unwrap());
        assert_eq!(p.days_since_last_order, 10);
        assert_eq!(p.segment, Segment::Champions);
    }

    #[test]
    fn test_days_since_last_order_floors() {
        let profiles = segment_customers(
            &[record("C1", "2024-06-29T13:00:00Z", 1.0)],
            now(),
        );
        assert_eq!(profiles[0].days_since_last_order, 0);

        let future = segment_customers(&[record("C1", "2024-07-01", 1.0)], now());
        assert_eq!(future[0].days_since_last_order, -1);
    }

    #[test]
    fn test_segments_follow_thresholds() {
        // Three customers: index floor(0.99) = 0, so thresholds are the best values
        let records = vec![
            record("big", "2024-06-29", 500.0),
            record("big", "2024-06-28", 500.0),
            record("big", "2024-06-27", 500.0),
            record("old", "2024-01-01", 2000.0),
            record("new", "2024-06-29", 10.0),
        ];
        let profiles = segment_customers(&records, now());
        let by_id: HashMap<&str, Segment> = profiles
            .iter()
            .map(|p| (p.customer_id.as_str(), p.segment))
            .collect();

        // monetary threshold 2000, frequency 3, recency 1 day
        assert_eq!(by_id["big"], Segment::NewCustomers);
        assert_eq!(by_id["old"], Segment::AtRisk);
        assert_eq!(by_id["new"], Segment::NeedAttention);

        let ids: Vec<&str> = profiles.iter().map(|p| p.customer_id.as_str()).collect();
        assert_eq!(ids, vec!["big", "old", "new"]);
    }

    #[test]
    fn test_threshold_index_uses_33rd_percentile() {
        let records: Vec<SalesRecord> = (1..=10)
            .map(|i| record(&format!("C{i}"), "2024-06-01", i as f64 * 100.0))
            .collect();
        let profiles = segment_customers(&records, now());
        let thresholds = RfmThresholds::from_profiles(&profiles).unwrap();

        // floor(3.3) = 3 -> fourth highest spend
        assert_eq!(thresholds.monetary, 700.0);
        assert_eq!(thresholds.frequency, 1);
        assert_eq!(thresholds.recency, 29);

        let champions = profiles
            .iter()
            .filter(|p| p.segment == Segment::Champions)
            .count();
        assert_eq!(champions, 4);
        assert_eq!(segment_counts(&profiles)[0], (Segment::Champions, 4));
        assert_eq!(segment_counts(&profiles)[4], (Segment::NewCustomers, 6));
    }

    #[test]
    fn test_decision_table() {
        use Segment::*;
        let table = [
            ((true, true, true), Champions),
            ((true, true, false), LoyalCustomers),
            ((true, false, true), PotentialLoyalists),
            ((true, false, false), AtRisk),
            ((false, true, true), NewCustomers),
            ((false, true, false), Promising),
            ((false, false, true), NeedAttention),
            ((false, false, false), CannotLoseThem),
        ];
        for ((h, f, r), expected) in table {
            assert_eq!(Segment::classify(h, f, r), expected);
        }
    }

    #[test]
    fn test_segment_labels() {
        assert_eq!(Segment::LoyalCustomers.to_string(), "Loyal Customers");
        assert_eq!(
            serde_json::to_string(&Segment::CannotLoseThem).unwrap(),
            "\"Cannot Lose Them\""
        );
        assert_eq!(segment_counts(&[]).len(), 8);
    }
}
