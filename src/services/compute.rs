use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use thiserror::Error;
use uuid::Uuid;

use crate::models::analytics::{
    AcquisitionCount, CustomerSummary, DailyMetric, MonthlyTrend, RevenueShare,
};
use crate::models::record::{Customer, Snapshot, Transaction};
use crate::services::anomaly;
use crate::services::cohort;
use crate::services::segmentation::{self, RfmInput};
use crate::services::store::{Generation, RecordCounts};

/// Input integrity errors. Any of these aborts the whole recomputation;
/// the previously published generation stays in place.
#[derive(Debug, Error, PartialEq)]
pub enum ComputeError {
    #[error("transaction {transaction_id} references unknown customer {customer_id}")]
    OrphanTransaction {
        transaction_id: String,
        customer_id: String,
    },
    #[error("transaction {transaction_id} has negative amount {amount}")]
    NegativeAmount {
        transaction_id: String,
        amount: Decimal,
    },
}

/// Part of whole as a percentage rounded to 2 decimals, undefined for a
/// zero denominator.
fn decimal_percentage(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    Some((part / whole * dec!(100)).round_dp(2))
}

fn validate(snapshot: &Snapshot) -> Result<(), ComputeError> {
    let known: HashSet<&str> = snapshot
        .customers
        .iter()
        .map(|c| c.customer_id.as_str())
        .collect();
    for tx in &snapshot.transactions {
        if !known.contains(tx.customer_id.as_str()) {
            return Err(ComputeError::OrphanTransaction {
                transaction_id: tx.transaction_id.clone(),
                customer_id: tx.customer_id.clone(),
            });
        }
        if tx.amount < Decimal::ZERO {
            return Err(ComputeError::NegativeAmount {
                transaction_id: tx.transaction_id.clone(),
                amount: tx.amount,
            });
        }
    }
    Ok(())
}

struct CustomerAccum {
    total: Decimal,
    count: u64,
    first: DateTime<Utc>,
    last: DateTime<Utc>,
}

#[derive(Default)]
struct GroupAccum<'a> {
    count: u64,
    revenue: Decimal,
    customers: HashSet<&'a str>,
}

fn customer_summaries(completed: &[&Transaction], as_of: DateTime<Utc>) -> Vec<CustomerSummary> {
    let mut per_customer: BTreeMap<&str, CustomerAccum> = BTreeMap::new();
    for tx in completed {
        per_customer
            .entry(tx.customer_id.as_str())
            .and_modify(|acc| {
                acc.total += tx.amount;
                acc.count += 1;
                acc.first = acc.first.min(tx.transaction_date);
                acc.last = acc.last.max(tx.transaction_date);
            })
            .or_insert(CustomerAccum {
                total: tx.amount,
                count: 1,
                first: tx.transaction_date,
                last: tx.transaction_date,
            });
    }

    per_customer
        .into_iter()
        .map(|(customer_id, acc)| {
            let avg_order_value = acc.total / Decimal::from(acc.count);
            let days = segmentation::days_between(as_of, acc.last);
            let segment = segmentation::classify(&RfmInput {
                total_spent: acc.total,
                total_transactions: acc.count,
                days_since_last_purchase: days,
            });
            CustomerSummary {
                customer_id: customer_id.to_string(),
                total_spent: acc.total,
                total_transactions: acc.count,
                avg_order_value,
                first_purchase: acc.first,
                last_purchase: acc.last,
                days_since_last_purchase: days,
                segment,
                churn_tier: segmentation::churn_tier(days),
            }
        })
        .collect()
}

fn daily_metrics(completed: &[&Transaction]) -> Vec<DailyMetric> {
    let mut per_day: BTreeMap<NaiveDate, GroupAccum> = BTreeMap::new();
    for tx in completed {
        let acc = per_day.entry(tx.transaction_date.date_naive()).or_default();
        acc.count += 1;
        acc.revenue += tx.amount;
        acc.customers.insert(tx.customer_id.as_str());
    }

    per_day
        .into_iter()
        .map(|(date, acc)| DailyMetric {
            date,
            transaction_count: acc.count,
            revenue: acc.revenue,
            avg_transaction_value: acc.revenue / Decimal::from(acc.count),
            distinct_customers: acc.customers.len() as u64,
        })
        .collect()
}

/// Monthly rollups with period-over-period growth. The lag is a single
/// running "previous" reference over the chronologically sorted months;
/// growth is undefined for the first month and whenever the prior
/// month's revenue is zero.
fn monthly_trends(completed: &[&Transaction]) -> Vec<MonthlyTrend> {
    let mut per_month: BTreeMap<(i32, u32), GroupAccum> = BTreeMap::new();
    for tx in completed {
        let key = (tx.transaction_date.year(), tx.transaction_date.month());
        let acc = per_month.entry(key).or_default();
        acc.count += 1;
        acc.revenue += tx.amount;
        acc.customers.insert(tx.customer_id.as_str());
    }

    let mut trends = Vec::with_capacity(per_month.len());
    let mut previous: Option<Decimal> = None;
    for ((year, month), acc) in per_month {
        let growth_percentage = match previous {
            Some(prev) if !prev.is_zero() => {
                Some(((acc.revenue - prev) / prev * dec!(100)).round_dp(2))
            }
            _ => None,
        };
        trends.push(MonthlyTrend {
            month: format!("{:04}-{:02}", year, month),
            transaction_count: acc.count,
            revenue: acc.revenue,
            distinct_customers: acc.customers.len() as u64,
            prev_month_revenue: previous,
            growth_percentage,
        });
        previous = Some(acc.revenue);
    }
    trends
}

/// Linearly interpolated quantile over an ascending-sorted slice,
/// `None` when empty.
fn percentile(sorted: &[Decimal], q: Decimal) -> Option<Decimal> {
    if sorted.is_empty() {
        return None;
    }
    let rank = Decimal::from(sorted.len() - 1) * q;
    let lower = rank.floor();
    let idx = lower.to_usize()?;
    let frac = rank - lower;
    let low = sorted[idx];
    let high = sorted[(idx + 1).min(sorted.len() - 1)];
    Some(low + frac * (high - low))
}

/// The high-value cutoff: 80th percentile of per-customer total spend.
fn high_value_threshold(summaries: &[CustomerSummary]) -> Option<Decimal> {
    let mut spends: Vec<Decimal> = summaries.iter().map(|s| s.total_spent).collect();
    spends.sort();
    percentile(&spends, dec!(0.8))
}

/// New registrations per calendar month, truncated to the most recent
/// 12 populated months.
fn acquisition_counts(customers: &[Customer]) -> Vec<AcquisitionCount> {
    let mut per_month: BTreeMap<String, u64> = BTreeMap::new();
    for customer in customers {
        let label = format!(
            "{:04}-{:02}",
            customer.registration_date.year(),
            customer.registration_date.month()
        );
        *per_month.entry(label).or_insert(0) += 1;
    }

    let skip = per_month.len().saturating_sub(12);
    per_month
        .into_iter()
        .skip(skip)
        .map(|(month, new_customers)| AcquisitionCount {
            month,
            new_customers,
        })
        .collect()
}

/// Revenue share per grouping key (category or payment method), sorted
/// by revenue descending with the label as tiebreaker.
fn revenue_shares<F>(completed: &[&Transaction], key: F) -> Vec<RevenueShare>
where
    F: Fn(&Transaction) -> &str,
{
    let mut per_key: BTreeMap<&str, Decimal> = BTreeMap::new();
    for tx in completed {
        *per_key.entry(key(tx)).or_insert(Decimal::ZERO) += tx.amount;
    }
    let total: Decimal = per_key.values().copied().sum();

    let mut shares: Vec<RevenueShare> = per_key
        .into_iter()
        .map(|(label, revenue)| RevenueShare {
            label: label.to_string(),
            revenue,
            share_percentage: decimal_percentage(revenue, total),
        })
        .collect();
    shares.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.label.cmp(&b.label)));
    shares
}

/// Map one record-set snapshot to a complete generation of derived
/// tables. Pure with respect to its inputs: the reference "now" comes
/// from the caller, so recomputing with an identical snapshot and
/// identical `as_of` yields identical tables.
pub fn compute_generation(
    snapshot: &Snapshot,
    as_of: DateTime<Utc>,
) -> Result<Generation, ComputeError> {
    validate(snapshot)?;

    let completed: Vec<&Transaction> = snapshot
        .transactions
        .iter()
        .filter(|tx| tx.is_completed())
        .collect();

    tracing::info!(
        "Computing generation as of {}: {} customers, {} transactions ({} completed), {} events",
        as_of,
        snapshot.customers.len(),
        snapshot.transactions.len(),
        completed.len(),
        snapshot.events.len()
    );

    let customer_summaries = customer_summaries(&completed, as_of);
    let daily_metrics = daily_metrics(&completed);
    let monthly_trends = monthly_trends(&completed);
    let category_shares = revenue_shares(&completed, |tx| tx.category.as_str());
    let payment_method_shares = revenue_shares(&completed, |tx| tx.payment_method.as_str());
    let churn = segmentation::compute_churn_metrics(&customer_summaries);
    // The anomaly window covers the full population, not just completed
    // transactions: pending and failed attempts are fraud-relevant too.
    let anomalies = anomaly::analyze(&snapshot.transactions);
    let cohorts = cohort::build_retention(&snapshot.customers, &snapshot.transactions);
    let high_value_threshold = high_value_threshold(&customer_summaries);
    let acquisition = acquisition_counts(&snapshot.customers);

    Ok(Generation {
        generation_id: Uuid::new_v4(),
        as_of,
        customer_summaries,
        daily_metrics,
        monthly_trends,
        cohort_cells: cohorts.cells,
        category_shares,
        payment_method_shares,
        churn,
        anomalies,
        high_value_threshold,
        acquisition,
        causality_exclusions: cohorts.causality_exclusions,
        record_counts: RecordCounts {
            customers: snapshot.customers.len() as u64,
            transactions: snapshot.transactions.len() as u64,
            events: snapshot.events.len() as u64,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{Customer, TransactionStatus};
    use crate::services::segmentation::Segment;
    use chrono::TimeZone;

    fn customer(id: &str, year: i32, month: u32, day: u32) -> Customer {
        Customer {
            customer_id: id.to_string(),
            registration_date: Utc.with_ymd_and_hms(year, month, day, 8, 0, 0).unwrap(),
            is_active: true,
        }
    }

    fn tx_on(
        id: &str,
        customer: &str,
        year: i32,
        month: u32,
        day: u32,
        amount: Decimal,
        status: TransactionStatus,
    ) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            customer_id: customer.to_string(),
            transaction_date: Utc.with_ymd_and_hms(year, month, day, 14, 30, 0).unwrap(),
            amount,
            currency: "USD".to_string(),
            merchant: "Acme".to_string(),
            category: "retail".to_string(),
            payment_method: "credit_card".to_string(),
            status,
        }
    }

    #[test]
    fn test_orphan_transaction_rejected() {
        let snapshot = Snapshot {
            customers: vec![customer("C1", 2024, 1, 1)],
            transactions: vec![tx_on(
                "T1",
                "GHOST",
                2024,
                2,
                1,
                dec!(10),
                TransactionStatus::Completed,
            )],
            events: Vec::new(),
        };
        let err = compute_generation(&snapshot, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            ComputeError::OrphanTransaction {
                transaction_id: "T1".to_string(),
                customer_id: "GHOST".to_string(),
            }
        );
    }

    #[test]
    fn test_negative_amount_rejected() {
        let snapshot = Snapshot {
            customers: vec![customer("C1", 2024, 1, 1)],
            transactions: vec![tx_on(
                "T1",
                "C1",
                2024,
                2,
                1,
                dec!(-5),
                TransactionStatus::Completed,
            )],
            events: Vec::new(),
        };
        let err = compute_generation(&snapshot, Utc::now()).unwrap_err();
        assert!(matches!(err, ComputeError::NegativeAmount { .. }));
    }

    #[test]
    fn test_single_customer_rollup() {
        // C1: 100 + 150 + 120 completed on D, D+10, D+20; as_of = D+25.
        let snapshot = Snapshot {
            customers: vec![customer("C1", 2024, 4, 1)],
            transactions: vec![
                tx_on("T1", "C1", 2024, 5, 1, dec!(100), TransactionStatus::Completed),
                tx_on("T2", "C1", 2024, 5, 11, dec!(150), TransactionStatus::Completed),
                tx_on("T3", "C1", 2024, 5, 21, dec!(120), TransactionStatus::Completed),
            ],
            events: Vec::new(),
        };
        let as_of = Utc.with_ymd_and_hms(2024, 5, 26, 10, 0, 0).unwrap();
        let generation = compute_generation(&snapshot, as_of).unwrap();

        assert_eq!(generation.customer_summaries.len(), 1);
        let summary = &generation.customer_summaries[0];
        assert_eq!(summary.total_spent, dec!(370));
        assert_eq!(summary.total_transactions, 3);
        assert_eq!(summary.avg_order_value.round_dp(2), dec!(123.33));
        assert_eq!(summary.days_since_last_purchase, 5);
        assert_eq!(summary.segment, Segment::PotentialLoyalists);
    }

    #[test]
    fn test_only_completed_transactions_count() {
        let snapshot = Snapshot {
            customers: vec![customer("C1", 2024, 1, 1)],
            transactions: vec![
                tx_on("T1", "C1", 2024, 2, 1, dec!(100), TransactionStatus::Completed),
                tx_on("T2", "C1", 2024, 2, 2, dec!(900), TransactionStatus::Pending),
                tx_on("T3", "C1", 2024, 2, 3, dec!(900), TransactionStatus::Failed),
            ],
            events: Vec::new(),
        };
        let as_of = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let generation = compute_generation(&snapshot, as_of).unwrap();

        let summary = &generation.customer_summaries[0];
        assert_eq!(summary.total_spent, dec!(100));
        assert_eq!(summary.total_transactions, 1);
        assert_eq!(generation.daily_metrics.len(), 1);
        assert_eq!(generation.daily_metrics[0].revenue, dec!(100));
    }

    #[test]
    fn test_customers_without_transactions_have_no_summary() {
        let snapshot = Snapshot {
            customers: vec![customer("C1", 2024, 1, 1), customer("C2", 2024, 1, 1)],
            transactions: vec![tx_on(
                "T1",
                "C1",
                2024,
                2,
                1,
                dec!(100),
                TransactionStatus::Completed,
            )],
            events: Vec::new(),
        };
        let generation =
            compute_generation(&snapshot, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
                .unwrap();
        assert_eq!(generation.customer_summaries.len(), 1);
        // Churn denominator excludes the zero-transaction customer.
        assert_eq!(generation.churn.total_customers, 1);
    }

    #[test]
    fn test_daily_metrics_distinct_customers() {
        let snapshot = Snapshot {
            customers: vec![customer("C1", 2024, 1, 1), customer("C2", 2024, 1, 1)],
            transactions: vec![
                tx_on("T1", "C1", 2024, 2, 1, dec!(10), TransactionStatus::Completed),
                tx_on("T2", "C1", 2024, 2, 1, dec!(20), TransactionStatus::Completed),
                tx_on("T3", "C2", 2024, 2, 1, dec!(30), TransactionStatus::Completed),
            ],
            events: Vec::new(),
        };
        let generation =
            compute_generation(&snapshot, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
                .unwrap();
        assert_eq!(generation.daily_metrics.len(), 1);
        let day = &generation.daily_metrics[0];
        assert_eq!(day.transaction_count, 3);
        assert_eq!(day.revenue, dec!(60));
        assert_eq!(day.avg_transaction_value, dec!(20));
        assert_eq!(day.distinct_customers, 2);
    }

    #[test]
    fn test_monthly_growth_lag_semantics() {
        // Revenue by month: 100, 150, 0, 50.
        let snapshot = Snapshot {
            customers: vec![customer("C1", 2023, 12, 1)],
            transactions: vec![
                tx_on("T1", "C1", 2024, 1, 5, dec!(100), TransactionStatus::Completed),
                tx_on("T2", "C1", 2024, 2, 5, dec!(150), TransactionStatus::Completed),
                tx_on("T3", "C1", 2024, 3, 5, dec!(0), TransactionStatus::Completed),
                tx_on("T4", "C1", 2024, 4, 5, dec!(50), TransactionStatus::Completed),
            ],
            events: Vec::new(),
        };
        let generation =
            compute_generation(&snapshot, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
                .unwrap();

        let months: Vec<&str> = generation
            .monthly_trends
            .iter()
            .map(|t| t.month.as_str())
            .collect();
        assert_eq!(months, vec!["2024-01", "2024-02", "2024-03", "2024-04"]);

        let growth: Vec<Option<Decimal>> = generation
            .monthly_trends
            .iter()
            .map(|t| t.growth_percentage)
            .collect();
        // First month undefined; then +50%; then -100%; then undefined
        // because the prior month's revenue was zero.
        assert_eq!(
            growth,
            vec![None, Some(dec!(50.00)), Some(dec!(-100.00)), None]
        );
        assert_eq!(generation.monthly_trends[3].prev_month_revenue, Some(dec!(0)));
    }

    #[test]
    fn test_growth_rounded_to_two_decimals() {
        // 100 -> 133: growth 33.00; 133 -> 177: 33.082... -> 33.08.
        let snapshot = Snapshot {
            customers: vec![customer("C1", 2023, 12, 1)],
            transactions: vec![
                tx_on("T1", "C1", 2024, 1, 5, dec!(100), TransactionStatus::Completed),
                tx_on("T2", "C1", 2024, 2, 5, dec!(133), TransactionStatus::Completed),
                tx_on("T3", "C1", 2024, 3, 5, dec!(177), TransactionStatus::Completed),
            ],
            events: Vec::new(),
        };
        let generation =
            compute_generation(&snapshot, Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap())
                .unwrap();
        assert_eq!(
            generation.monthly_trends[2].growth_percentage,
            Some(dec!(33.08))
        );
    }

    #[test]
    fn test_revenue_shares() {
        let mut t1 = tx_on("T1", "C1", 2024, 1, 1, dec!(300), TransactionStatus::Completed);
        t1.category = "retail".to_string();
        let mut t2 = tx_on("T2", "C1", 2024, 1, 2, dec!(100), TransactionStatus::Completed);
        t2.category = "food".to_string();
        let snapshot = Snapshot {
            customers: vec![customer("C1", 2023, 12, 1)],
            transactions: vec![t1, t2],
            events: Vec::new(),
        };
        let generation =
            compute_generation(&snapshot, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap())
                .unwrap();

        assert_eq!(generation.category_shares.len(), 2);
        assert_eq!(generation.category_shares[0].label, "retail");
        assert_eq!(generation.category_shares[0].share_percentage, Some(dec!(75.00)));
        assert_eq!(generation.category_shares[1].share_percentage, Some(dec!(25.00)));
    }

    #[test]
    fn test_zero_revenue_shares_undefined() {
        let snapshot = Snapshot {
            customers: vec![customer("C1", 2023, 12, 1)],
            transactions: vec![tx_on(
                "T1",
                "C1",
                2024,
                1,
                1,
                dec!(0),
                TransactionStatus::Completed,
            )],
            events: Vec::new(),
        };
        let generation =
            compute_generation(&snapshot, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap())
                .unwrap();
        assert_eq!(generation.category_shares.len(), 1);
        assert_eq!(generation.category_shares[0].share_percentage, None);
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [dec!(100), dec!(200), dec!(300), dec!(400), dec!(500)];
        // rank = 4 * 0.8 = 3.2 -> 400 + 0.2 * 100.
        assert_eq!(percentile(&values, dec!(0.8)), Some(dec!(420)));
        assert_eq!(percentile(&values, dec!(0)), Some(dec!(100)));
        assert_eq!(percentile(&values, dec!(1)), Some(dec!(500)));
        assert_eq!(percentile(&[dec!(42)], dec!(0.8)), Some(dec!(42)));
        assert_eq!(percentile(&[], dec!(0.8)), None);
    }

    #[test]
    fn test_high_value_threshold_from_spends() {
        let snapshot = Snapshot {
            customers: (1..=5).map(|i| customer(&format!("C{}", i), 2024, 1, 1)).collect(),
            transactions: (1..=5)
                .map(|i| {
                    tx_on(
                        &format!("T{}", i),
                        &format!("C{}", i),
                        2024,
                        2,
                        1,
                        Decimal::from(i * 100),
                        TransactionStatus::Completed,
                    )
                })
                .collect(),
            events: Vec::new(),
        };
        let generation =
            compute_generation(&snapshot, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
                .unwrap();
        assert_eq!(generation.high_value_threshold, Some(dec!(420)));
    }

    #[test]
    fn test_no_threshold_without_purchasers() {
        let snapshot = Snapshot {
            customers: vec![customer("C1", 2024, 1, 1)],
            transactions: Vec::new(),
            events: Vec::new(),
        };
        let generation =
            compute_generation(&snapshot, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
                .unwrap();
        assert_eq!(generation.high_value_threshold, None);
    }

    #[test]
    fn test_acquisition_counts_last_twelve_months() {
        // 14 consecutive registration months, two sign-ups in the last.
        let mut customers = Vec::new();
        for i in 0..14u32 {
            let (year, month) = (2023 + (i / 12) as i32, i % 12 + 1);
            customers.push(customer(&format!("C{}", i), year, month, 10));
        }
        customers.push(customer("C99", 2024, 2, 20));

        let snapshot = Snapshot {
            customers,
            transactions: Vec::new(),
            events: Vec::new(),
        };
        let generation =
            compute_generation(&snapshot, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
                .unwrap();

        assert_eq!(generation.acquisition.len(), 12);
        // The two oldest months fall off.
        assert_eq!(generation.acquisition[0].month, "2023-03");
        assert_eq!(generation.acquisition[11].month, "2024-02");
        assert_eq!(generation.acquisition[11].new_customers, 2);
        assert_eq!(generation.acquisition[10].new_customers, 1);
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let snapshot = Snapshot {
            customers: vec![
                customer("C1", 2024, 1, 1),
                customer("C2", 2024, 2, 1),
                customer("C3", 2024, 2, 20),
            ],
            transactions: vec![
                tx_on("T1", "C1", 2024, 1, 10, dec!(120), TransactionStatus::Completed),
                tx_on("T2", "C2", 2024, 2, 11, dec!(80), TransactionStatus::Completed),
                tx_on("T3", "C1", 2024, 3, 12, dec!(45.50), TransactionStatus::Completed),
                tx_on("T4", "C3", 2024, 3, 13, dec!(260), TransactionStatus::Pending),
                tx_on("T5", "C3", 2024, 3, 14, dec!(9000), TransactionStatus::Completed),
            ],
            events: Vec::new(),
        };
        let as_of = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();

        let a = compute_generation(&snapshot, as_of).unwrap();
        let b = compute_generation(&snapshot, as_of).unwrap();

        assert_eq!(a.customer_summaries, b.customer_summaries);
        assert_eq!(a.daily_metrics, b.daily_metrics);
        assert_eq!(a.monthly_trends, b.monthly_trends);
        assert_eq!(a.cohort_cells, b.cohort_cells);
        assert_eq!(a.category_shares, b.category_shares);
        assert_eq!(a.payment_method_shares, b.payment_method_shares);
        assert_eq!(a.churn, b.churn);
        assert_eq!(a.anomalies, b.anomalies);
        assert_eq!(a.high_value_threshold, b.high_value_threshold);
        assert_eq!(a.acquisition, b.acquisition);
    }

    #[test]
    fn test_cohort_cells_wired_through() {
        let snapshot = Snapshot {
            customers: vec![customer("C1", 2024, 1, 1)],
            transactions: vec![
                tx_on("T1", "C1", 2024, 1, 10, dec!(10), TransactionStatus::Completed),
                tx_on("T2", "C1", 2024, 3, 10, dec!(10), TransactionStatus::Completed),
            ],
            events: Vec::new(),
        };
        let generation =
            compute_generation(&snapshot, Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap())
                .unwrap();
        let offsets: Vec<u32> = generation
            .cohort_cells
            .iter()
            .map(|c| c.period_offset)
            .collect();
        assert_eq!(offsets, vec![0, 2]);
    }
}
