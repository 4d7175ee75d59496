use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::{
    AppState,
    models::analytics::CustomerSummary,
    models::responses::{CustomerAnalyticsResponse, ErrorResponse, SegmentClvRow, round2},
    services::segmentation::Segment,
};

/// Handler for GET /analytics/customers
///
/// Customer-lifetime-value aggregates (spend and purchase frequency)
/// grouped by segment, plus one-time vs repeat buyer totals.
pub async fn get_customer_analytics(
    State(state): State<AppState>,
) -> Result<Json<CustomerAnalyticsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let generation = state.store.current().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "No analytics generation published yet".to_string(),
            }),
        )
    })?;

    let summaries = &generation.customer_summaries;
    let with_purchases = summaries.len() as u64;
    let one_time = summaries
        .iter()
        .filter(|s| s.total_transactions == 1)
        .count() as u64;
    let total_purchases: u64 = summaries.iter().map(|s| s.total_transactions).sum();
    let avg_purchase_frequency = if with_purchases == 0 {
        None
    } else {
        (Decimal::from(total_purchases) / Decimal::from(with_purchases))
            .round_dp(2)
            .to_f64()
    };

    let mut segments = Vec::new();
    for segment in Segment::ALL {
        let members: Vec<&CustomerSummary> =
            summaries.iter().filter(|s| s.segment == segment).collect();
        if members.is_empty() {
            continue;
        }
        let count = members.len() as u64;
        let total: Decimal = members.iter().map(|s| s.total_spent).sum();
        let min = members.iter().map(|s| s.total_spent).min().unwrap_or_default();
        let max = members.iter().map(|s| s.total_spent).max().unwrap_or_default();
        let purchases: u64 = members.iter().map(|s| s.total_transactions).sum();
        segments.push(SegmentClvRow {
            segment: segment.as_str().to_string(),
            customer_count: count,
            total_revenue: round2(total),
            avg_spend: round2(total / Decimal::from(count)),
            min_spend: round2(min),
            max_spend: round2(max),
            avg_frequency: round2(Decimal::from(purchases) / Decimal::from(count)),
        });
    }

    Ok(Json(CustomerAnalyticsResponse {
        total_customers: generation.record_counts.customers,
        customers_with_purchases: with_purchases,
        one_time_buyers: one_time,
        repeat_customers: with_purchases - one_time,
        avg_purchase_frequency,
        segments,
        customer_acquisition: generation.acquisition.clone(),
    }))
}
