use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::record::Transaction;
use crate::services::segmentation::{ChurnTier, Segment};

/// Per-customer rollup over completed transactions. Recomputed wholesale
/// each generation, never partially mutated. Only customers with at least
/// one completed transaction get a summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub customer_id: String,
    pub total_spent: Decimal,
    pub total_transactions: u64,
    pub avg_order_value: Decimal,
    pub first_purchase: DateTime<Utc>,
    pub last_purchase: DateTime<Utc>,
    /// Whole calendar days between the generation's "as of" instant and
    /// `last_purchase`.
    pub days_since_last_purchase: i64,
    pub segment: Segment,
    pub churn_tier: ChurnTier,
}

/// Per-calendar-day rollup of completed transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMetric {
    pub date: NaiveDate,
    pub transaction_count: u64,
    pub revenue: Decimal,
    pub avg_transaction_value: Decimal,
    pub distinct_customers: u64,
}

/// Per-calendar-month rollup, ordered by month. `growth_percentage` is
/// undefined for the first month and whenever the prior month's revenue
/// is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    /// "YYYY-MM"
    pub month: String,
    pub transaction_count: u64,
    pub revenue: Decimal,
    pub distinct_customers: u64,
    pub prev_month_revenue: Option<Decimal>,
    pub growth_percentage: Option<Decimal>,
}

/// One cell of the retention matrix: how many distinct customers from
/// `cohort_month` had completed activity `period_offset` months later.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortCell {
    /// "YYYY-MM" of the cohort's registration month.
    pub cohort_month: String,
    pub period_offset: u32,
    pub retained_customers: u64,
}

/// New registrations in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcquisitionCount {
    /// "YYYY-MM"
    pub month: String,
    pub new_customers: u64,
}

/// Revenue share of one category or payment method against the total.
/// `share_percentage` is undefined when total revenue is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueShare {
    pub label: String,
    pub revenue: Decimal,
    pub share_percentage: Option<Decimal>,
}

/// Churn figures over the population of customers with at least one
/// completed transaction. `churn_rate` is undefined only when that
/// population is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChurnMetrics {
    pub churn_rate: Option<Decimal>,
    pub churned_customers: u64,
    pub at_risk_customers: u64,
    pub total_customers: u64,
    pub by_segment: Vec<SegmentChurn>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentChurn {
    pub segment: Segment,
    pub total_customers: u64,
    pub churned_customers: u64,
    pub churn_rate: Option<Decimal>,
}

/// Output of the two anomaly detectors over one evaluation window. The
/// detectors are independent; the same transaction may appear in both
/// `flagged` and a burst group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub mean_amount: f64,
    pub std_dev_amount: f64,
    pub threshold: f64,
    /// Transactions with `amount > mean + 3 * std_dev`, sorted by amount
    /// descending, ties broken by transaction id ascending.
    pub flagged: Vec<Transaction>,
    pub burst_groups: Vec<BurstGroup>,
}

/// All transactions of one customer on one day whose count or amount sum
/// crossed the burst thresholds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurstGroup {
    pub customer_id: String,
    pub date: NaiveDate,
    pub transaction_count: u64,
    pub total_amount: Decimal,
    pub transactions: Vec<Transaction>,
}
