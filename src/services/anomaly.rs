use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

use crate::models::analytics::{AnomalyReport, BurstGroup};
use crate::models::record::Transaction;

/// Same-day per-customer transaction count above which a burst is flagged.
const BURST_COUNT_THRESHOLD: u64 = 10;

/// Same-day per-customer amount sum above which a burst is flagged.
const BURST_AMOUNT_THRESHOLD: Decimal = dec!(5000);

/// Single-pass mean/variance accumulator (Welford). Avoids the
/// catastrophic cancellation of the sum-of-squares formula on large
/// amount populations.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population variance (divides by n, not n - 1).
    pub fn population_variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    pub fn population_std_dev(&self) -> f64 {
        self.population_variance().sqrt()
    }
}

/// Run both detectors over the evaluation window. The 3-sigma baseline is
/// computed over the full transaction population, including burst-flagged
/// transactions.
pub fn analyze(transactions: &[Transaction]) -> AnomalyReport {
    let mut stats = RunningStats::new();
    for tx in transactions {
        stats.push(tx.amount.to_f64().unwrap_or_default());
    }

    let threshold = stats.mean() + 3.0 * stats.population_std_dev();

    let mut flagged: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| tx.amount.to_f64().unwrap_or_default() > threshold)
        .cloned()
        .collect();
    flagged.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.transaction_id.cmp(&b.transaction_id))
    });

    let burst_groups = detect_bursts(transactions);

    tracing::debug!(
        "Anomaly scan: {} transactions, threshold {:.2}, {} flagged, {} burst groups",
        transactions.len(),
        threshold,
        flagged.len(),
        burst_groups.len()
    );

    AnomalyReport {
        mean_amount: stats.mean(),
        std_dev_amount: stats.population_std_dev(),
        threshold,
        flagged,
        burst_groups,
    }
}

/// Group transactions by (customer, calendar day) and surface every group
/// whose count exceeds 10 or whose amount sum exceeds 5000.
pub fn detect_bursts(transactions: &[Transaction]) -> Vec<BurstGroup> {
    let mut by_day: HashMap<(&str, NaiveDate), Vec<&Transaction>> = HashMap::new();
    for tx in transactions {
        by_day
            .entry((tx.customer_id.as_str(), tx.transaction_date.date_naive()))
            .or_default()
            .push(tx);
    }

    let mut groups = Vec::new();
    for ((customer_id, date), day_txs) in by_day {
        let count = day_txs.len() as u64;
        let total: Decimal = day_txs.iter().map(|tx| tx.amount).sum();
        if count > BURST_COUNT_THRESHOLD || total > BURST_AMOUNT_THRESHOLD {
            let mut transactions: Vec<Transaction> =
                day_txs.into_iter().cloned().collect();
            transactions.sort_by(|a, b| a.transaction_id.cmp(&b.transaction_id));
            groups.push(BurstGroup {
                customer_id: customer_id.to_string(),
                date,
                transaction_count: count,
                total_amount: total,
                transactions,
            });
        }
    }
    groups.sort_by(|a, b| a.customer_id.cmp(&b.customer_id).then(a.date.cmp(&b.date)));
    groups
}
