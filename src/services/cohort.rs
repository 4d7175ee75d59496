use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, Utc};

use crate::models::analytics::CohortCell;
use crate::models::record::{Customer, Transaction};

/// Retention matrix plus the count of (customer, transaction) pairs
/// excluded for activity dated before registration.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortBuild {
    pub cells: Vec<CohortCell>,
    pub causality_exclusions: u64,
}

fn month_index(ts: DateTime<Utc>) -> i32 {
    ts.year() * 12 + ts.month0() as i32
}

fn month_label(ts: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", ts.year(), ts.month())
}

/// Build the retention matrix from registration months and completed
/// transaction activity. A customer transacting several times in the same
/// period offset counts once per cell; customers with no completed
/// transactions never appear.
pub fn build_retention(customers: &[Customer], transactions: &[Transaction]) -> CohortBuild {
    let registrations: HashMap<&str, (i32, String)> = customers
        .iter()
        .map(|c| {
            (
                c.customer_id.as_str(),
                (month_index(c.registration_date), month_label(c.registration_date)),
            )
        })
        .collect();

    let mut retained: BTreeMap<(String, u32), HashSet<&str>> = BTreeMap::new();
    let mut causality_exclusions: u64 = 0;

    for tx in transactions.iter().filter(|tx| tx.is_completed()) {
        let Some((reg_index, cohort_month)) = registrations.get(tx.customer_id.as_str()) else {
            // Input integrity is validated upstream; an unknown customer
            // here would already have aborted the recomputation.
            continue;
        };
        let offset = month_index(tx.transaction_date) - reg_index;
        if offset < 0 {
            causality_exclusions += 1;
            continue;
        }
        retained
            .entry((cohort_month.clone(), offset as u32))
            .or_default()
            .insert(tx.customer_id.as_str());
    }

    if causality_exclusions > 0 {
        tracing::warn!(
            "Excluded {} transaction(s) dated before customer registration from cohort analysis",
            causality_exclusions
        );
    }

    let cells = retained
        .into_iter()
        .map(|((cohort_month, period_offset), members)| CohortCell {
            cohort_month,
            period_offset,
            retained_customers: members.len() as u64,
        })
        .collect();

    CohortBuild {
        cells,
        causality_exclusions,
    }
}
