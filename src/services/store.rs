use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::analytics::{
    AcquisitionCount, AnomalyReport, ChurnMetrics, CohortCell, CustomerSummary, DailyMetric,
    MonthlyTrend, RevenueShare,
};
use crate::services::segmentation::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecordCounts {
    pub customers: u64,
    pub transactions: u64,
    pub events: u64,
}

/// One complete, atomically published set of derived aggregate tables.
/// All vectors are deterministically ordered by the compute engine.
#[derive(Debug, Clone)]
pub struct Generation {
    pub generation_id: Uuid,
    pub as_of: DateTime<Utc>,
    pub customer_summaries: Vec<CustomerSummary>,
    pub daily_metrics: Vec<DailyMetric>,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub cohort_cells: Vec<CohortCell>,
    pub category_shares: Vec<RevenueShare>,
    pub payment_method_shares: Vec<RevenueShare>,
    pub churn: ChurnMetrics,
    pub anomalies: AnomalyReport,
    /// 80th percentile of total spend; customers at or above it count as
    /// high-value. `None` when no customer has a completed transaction.
    pub high_value_threshold: Option<Decimal>,
    /// Registrations per month, most recent 12 populated months.
    pub acquisition: Vec<AcquisitionCount>,
    pub causality_exclusions: u64,
    pub record_counts: RecordCounts,
}

/// Holds the latest generation of derived tables behind a single
/// swappable reference. Readers clone the `Arc` and keep a whole
/// consistent generation for as long as they need it; `publish` swaps
/// the pointer in one step, so a mix of old and new rows is never
/// observable.
pub struct AggregationStore {
    current: RwLock<Option<Arc<Generation>>>,
    // At most one publish installs at a time; later publishers wait
    // (last writer wins, recomputation is idempotent).
    publish_gate: Mutex<()>,
}

impl AggregationStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            publish_gate: Mutex::new(()),
        }
    }

    /// The currently published generation, if any.
    pub fn current(&self) -> Option<Arc<Generation>> {
        self.current.read().clone()
    }

    /// Install a new complete generation. Either the whole generation
    /// becomes visible or (if the caller abandoned computation before
    /// calling this) nothing changes.
    pub fn publish(&self, generation: Generation) -> Arc<Generation> {
        let _serialized = self.publish_gate.lock();
        let generation = Arc::new(generation);
        tracing::info!(
            "Publishing generation {} (as of {}): {} summaries, {} daily rows, {} monthly rows, {} cohort cells",
            generation.generation_id,
            generation.as_of,
            generation.customer_summaries.len(),
            generation.daily_metrics.len(),
            generation.monthly_trends.len(),
            generation.cohort_cells.len()
        );
        *self.current.write() = Some(generation.clone());
        generation
    }

    pub fn get_customer_summary(&self, customer_id: &str) -> Option<CustomerSummary> {
        let generation = self.current()?;
        generation
            .customer_summaries
            .binary_search_by(|s| s.customer_id.as_str().cmp(customer_id))
            .ok()
            .map(|i| generation.customer_summaries[i].clone())
    }

    /// Summaries, optionally restricted to one segment.
    pub fn list_customer_summaries(&self, segment: Option<Segment>) -> Vec<CustomerSummary> {
        let Some(generation) = self.current() else {
            return Vec::new();
        };
        generation
            .customer_summaries
            .iter()
            .filter(|s| segment.map(|wanted| s.segment == wanted).unwrap_or(true))
            .cloned()
            .collect()
    }

    /// Daily metrics, optionally restricted to an inclusive date range.
    pub fn list_daily_metrics(&self, range: Option<(NaiveDate, NaiveDate)>) -> Vec<DailyMetric> {
        let Some(generation) = self.current() else {
            return Vec::new();
        };
        generation
            .daily_metrics
            .iter()
            .filter(|m| range.map(|(from, to)| m.date >= from && m.date <= to).unwrap_or(true))
            .cloned()
            .collect()
    }

    pub fn list_monthly_trends(&self) -> Vec<MonthlyTrend> {
        self.current()
            .map(|g| g.monthly_trends.clone())
            .unwrap_or_default()
    }

    pub fn list_cohort_cells(&self) -> Vec<CohortCell> {
        self.current()
            .map(|g| g.cohort_cells.clone())
            .unwrap_or_default()
    }
}

impl Default for AggregationStore {
    fn default() -> Self {
        Self::new()
    }
}
