use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::models::analytics::{ChurnMetrics, CustomerSummary, SegmentChurn};

/// RFM-style segment label. Exactly one label is assigned per eligible
/// customer summary by `classify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Segment {
    Champions,
    #[serde(rename = "Loyal Customers")]
    LoyalCustomers,
    #[serde(rename = "Potential Loyalists")]
    PotentialLoyalists,
    #[serde(rename = "At Risk")]
    AtRisk,
    Others,
}

impl Segment {
    pub const ALL: [Segment; 5] = [
        Segment::Champions,
        Segment::LoyalCustomers,
        Segment::PotentialLoyalists,
        Segment::AtRisk,
        Segment::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Champions => "Champions",
            Segment::LoyalCustomers => "Loyal Customers",
            Segment::PotentialLoyalists => "Potential Loyalists",
            Segment::AtRisk => "At Risk",
            Segment::Others => "Others",
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Churn classification, independent from the segment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChurnTier {
    Active,
    AtRisk,
    Churned,
}

/// Inputs to the segmentation rule cascade.
#[derive(Debug, Clone, Copy)]
pub struct RfmInput {
    pub total_spent: Decimal,
    pub total_transactions: u64,
    pub days_since_last_purchase: i64,
}

type Rule = (fn(&RfmInput) -> bool, Segment);

/// The ordered rule cascade. Rules are evaluated top-down and the first
/// satisfied rule wins; the final catch-all keeps the cascade total.
fn rule_cascade() -> [Rule; 5] {
    [
        (
            |c| {
                c.total_spent >= dec!(1000)
                    && c.total_transactions >= 10
                    && c.days_since_last_purchase <= 30
            },
            Segment::Champions,
        ),
        (
            |c| {
                c.total_spent >= dec!(500)
                    && c.total_transactions >= 5
                    && c.days_since_last_purchase <= 60
            },
            Segment::LoyalCustomers,
        ),
        (
            |c| c.total_spent >= dec!(200) && c.days_since_last_purchase <= 30,
            Segment::PotentialLoyalists,
        ),
        (|c| c.days_since_last_purchase > 90, Segment::AtRisk),
        (|_| true, Segment::Others),
    ]
}

/// Assign the segment label for one customer summary.
pub fn classify(input: &RfmInput) -> Segment {
    for (matches, segment) in rule_cascade() {
        if matches(input) {
            return segment;
        }
    }
    // Unreachable: the final rule always matches.
    Segment::Others
}

/// Churn tier from idle days: `> 90` churned, `60..=90` at risk.
pub fn churn_tier(days_since_last_purchase: i64) -> ChurnTier {
    if days_since_last_purchase > 90 {
        ChurnTier::Churned
    } else if days_since_last_purchase >= 60 {
        ChurnTier::AtRisk
    } else {
        ChurnTier::Active
    }
}

/// Whole calendar days between two instants. Computed on calendar dates
/// rather than naive timestamp subtraction.
pub fn days_between(now: DateTime<Utc>, then: DateTime<Utc>) -> i64 {
    (now.date_naive() - then.date_naive()).num_days()
}

/// Part of whole as a percentage rounded to 2 decimals, undefined for an
/// empty denominator.
pub fn percentage(part: u64, whole: u64) -> Option<Decimal> {
    if whole == 0 {
        return None;
    }
    Some((Decimal::from(part) / Decimal::from(whole) * dec!(100)).round_dp(2))
}

/// Churn metrics over all summaries, plus a per-segment breakdown.
/// Summaries only exist for customers with at least one completed
/// transaction, so the denominator invariant holds by construction.
pub fn compute_churn_metrics(summaries: &[CustomerSummary]) -> ChurnMetrics {
    let total = summaries.len() as u64;
    let churned = summaries
        .iter()
        .filter(|s| s.churn_tier == ChurnTier::Churned)
        .count() as u64;
    let at_risk = summaries
        .iter()
        .filter(|s| s.churn_tier == ChurnTier::AtRisk)
        .count() as u64;

    let mut by_segment = Vec::new();
    for segment in Segment::ALL {
        let members: Vec<&CustomerSummary> =
            summaries.iter().filter(|s| s.segment == segment).collect();
        if members.is_empty() {
            continue;
        }
        let segment_total = members.len() as u64;
        let segment_churned = members
            .iter()
            .filter(|s| s.churn_tier == ChurnTier::Churned)
            .count() as u64;
        by_segment.push(SegmentChurn {
            segment,
            total_customers: segment_total,
            churned_customers: segment_churned,
            churn_rate: percentage(segment_churned, segment_total),
        });
    }

    ChurnMetrics {
        churn_rate: percentage(churned, total),
        churned_customers: churned,
        at_risk_customers: at_risk,
        total_customers: total,
        by_segment,
    }
}
