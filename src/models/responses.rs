use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::models::analytics::{
    AcquisitionCount, AnomalyReport, BurstGroup, ChurnMetrics, CustomerSummary, DailyMetric,
    MonthlyTrend, RevenueShare,
};
use crate::models::record::{Snapshot, Transaction};
use crate::services::store::RecordCounts;

/// Internal computation keeps full precision; every monetary value and
/// ratio is rounded to 2 decimal places here, at the boundary.
pub fn round2(value: Decimal) -> f64 {
    value.round_dp(2).to_f64().unwrap_or_default()
}

fn round2_f64(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Snapshot handed over by the ingestion collaborator, together with the
/// explicit reference instant for recomputation.
#[derive(Debug, Deserialize)]
pub struct SnapshotPayload {
    pub as_of: DateTime<Utc>,
    pub customers: Vec<crate::models::record::Customer>,
    pub transactions: Vec<Transaction>,
    pub events: Vec<crate::models::record::Event>,
}

impl SnapshotPayload {
    pub fn into_parts(self) -> (Snapshot, DateTime<Utc>) {
        (
            Snapshot {
                customers: self.customers,
                transactions: self.transactions,
                events: self.events,
            },
            self.as_of,
        )
    }
}

#[derive(Debug, Serialize)]
pub struct SnapshotAccepted {
    pub generation_id: String,
    pub as_of: DateTime<Utc>,
    pub customers: u64,
    pub transactions: u64,
    pub events: u64,
    pub causality_exclusions: u64,
}

#[derive(Debug, Serialize)]
pub struct ChurnMetricsResponse {
    pub churn_rate: Option<f64>,
    pub churned_customers: u64,
    pub at_risk_customers: u64,
    pub total_customers: u64,
    pub by_segment: Vec<SegmentChurnRow>,
}

#[derive(Debug, Serialize)]
pub struct SegmentChurnRow {
    pub segment: String,
    pub total_customers: u64,
    pub churned_customers: u64,
    pub churn_rate: Option<f64>,
}

impl From<&ChurnMetrics> for ChurnMetricsResponse {
    fn from(metrics: &ChurnMetrics) -> Self {
        Self {
            churn_rate: metrics.churn_rate.map(round2),
            churned_customers: metrics.churned_customers,
            at_risk_customers: metrics.at_risk_customers,
            total_customers: metrics.total_customers,
            by_segment: metrics
                .by_segment
                .iter()
                .map(|s| SegmentChurnRow {
                    segment: s.segment.as_str().to_string(),
                    total_customers: s.total_customers,
                    churned_customers: s.churned_customers,
                    churn_rate: s.churn_rate.map(round2),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnomalyTransactionRow {
    pub transaction_id: String,
    pub customer_id: String,
    pub amount: f64,
    pub transaction_date: DateTime<Utc>,
    pub merchant: String,
    pub category: String,
}

impl From<&Transaction> for AnomalyTransactionRow {
    fn from(tx: &Transaction) -> Self {
        Self {
            transaction_id: tx.transaction_id.clone(),
            customer_id: tx.customer_id.clone(),
            amount: round2(tx.amount),
            transaction_date: tx.transaction_date,
            merchant: tx.merchant.clone(),
            category: tx.category.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BurstGroupRow {
    pub customer_id: String,
    pub date: NaiveDate,
    pub transaction_count: u64,
    pub total_amount: f64,
    pub transactions: Vec<AnomalyTransactionRow>,
}

impl From<&BurstGroup> for BurstGroupRow {
    fn from(group: &BurstGroup) -> Self {
        Self {
            customer_id: group.customer_id.clone(),
            date: group.date,
            transaction_count: group.transaction_count,
            total_amount: round2(group.total_amount),
            transactions: group.transactions.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnomaliesResponse {
    pub mean_amount: f64,
    pub std_dev_amount: f64,
    pub threshold: f64,
    pub large_transactions: Vec<AnomalyTransactionRow>,
    pub burst_groups: Vec<BurstGroupRow>,
}

impl From<&AnomalyReport> for AnomaliesResponse {
    fn from(report: &AnomalyReport) -> Self {
        Self {
            mean_amount: round2_f64(report.mean_amount),
            std_dev_amount: round2_f64(report.std_dev_amount),
            threshold: round2_f64(report.threshold),
            large_transactions: report.flagged.iter().map(Into::into).collect(),
            burst_groups: report.burst_groups.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HighValueCustomerRow {
    pub customer_id: String,
    pub total_spent: f64,
    pub total_transactions: u64,
    pub days_since_last_purchase: i64,
    pub customer_segment: String,
}

impl From<&CustomerSummary> for HighValueCustomerRow {
    fn from(summary: &CustomerSummary) -> Self {
        Self {
            customer_id: summary.customer_id.clone(),
            total_spent: round2(summary.total_spent),
            total_transactions: summary.total_transactions,
            days_since_last_purchase: summary.days_since_last_purchase,
            customer_segment: summary.segment.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HighValueSegmentsResponse {
    /// 80th percentile of per-customer total spend; membership cutoff
    /// for the list below.
    pub high_value_threshold: Option<f64>,
    pub customers: Vec<HighValueCustomerRow>,
}

#[derive(Debug, Deserialize)]
pub struct RevenueQuery {
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DailyMetricRow {
    pub date: NaiveDate,
    pub transaction_count: u64,
    pub revenue: f64,
    pub avg_transaction_value: f64,
    pub distinct_customers: u64,
}

impl From<&DailyMetric> for DailyMetricRow {
    fn from(metric: &DailyMetric) -> Self {
        Self {
            date: metric.date,
            transaction_count: metric.transaction_count,
            revenue: round2(metric.revenue),
            avg_transaction_value: round2(metric.avg_transaction_value),
            distinct_customers: metric.distinct_customers,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MonthlyTrendRow {
    pub month: String,
    pub transaction_count: u64,
    pub revenue: f64,
    pub distinct_customers: u64,
    pub prev_month_revenue: Option<f64>,
    pub growth_percentage: Option<f64>,
}

impl From<&MonthlyTrend> for MonthlyTrendRow {
    fn from(trend: &MonthlyTrend) -> Self {
        Self {
            month: trend.month.clone(),
            transaction_count: trend.transaction_count,
            revenue: round2(trend.revenue),
            distinct_customers: trend.distinct_customers,
            prev_month_revenue: trend.prev_month_revenue.map(round2),
            growth_percentage: trend.growth_percentage.map(round2),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RevenueShareRow {
    pub label: String,
    pub revenue: f64,
    pub share_percentage: Option<f64>,
}

impl From<&RevenueShare> for RevenueShareRow {
    fn from(share: &RevenueShare) -> Self {
        Self {
            label: share.label.clone(),
            revenue: round2(share.revenue),
            share_percentage: share.share_percentage.map(round2),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RevenueRows {
    Daily(Vec<DailyMetricRow>),
    Monthly(Vec<MonthlyTrendRow>),
}

#[derive(Debug, Serialize)]
pub struct RevenueAnalyticsResponse {
    pub period: String,
    pub total_revenue: f64,
    pub total_transactions: u64,
    pub revenue_per_customer: Option<f64>,
    pub rows: RevenueRows,
    pub category_shares: Vec<RevenueShareRow>,
    pub payment_method_shares: Vec<RevenueShareRow>,
}

#[derive(Debug, Serialize)]
pub struct SegmentClvRow {
    pub segment: String,
    pub customer_count: u64,
    pub total_revenue: f64,
    pub avg_spend: f64,
    pub min_spend: f64,
    pub max_spend: f64,
    pub avg_frequency: f64,
}

#[derive(Debug, Serialize)]
pub struct CustomerAnalyticsResponse {
    pub total_customers: u64,
    pub customers_with_purchases: u64,
    pub one_time_buyers: u64,
    pub repeat_customers: u64,
    pub avg_purchase_frequency: Option<f64>,
    pub segments: Vec<SegmentClvRow>,
    /// Registrations per month, most recent 12 populated months.
    pub customer_acquisition: Vec<AcquisitionCount>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub data_loaded: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiStatusResponse {
    pub api_version: String,
    pub data_status: String,
    pub generation_id: Option<String>,
    pub as_of: Option<DateTime<Utc>>,
    pub data_summary: Option<RecordCounts>,
    pub causality_exclusions: Option<u64>,
    pub available_endpoints: Vec<String>,
}
