use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::{
    AppState,
    models::responses::{ErrorResponse, RevenueAnalyticsResponse, RevenueQuery, RevenueRows},
};

/// Handler for GET /analytics/revenue?period=daily|monthly
pub async fn get_revenue_analytics(
    State(state): State<AppState>,
    Query(query): Query<RevenueQuery>,
) -> Result<Json<RevenueAnalyticsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let period = query.period.unwrap_or_else(|| "daily".to_string());
    if period != "daily" && period != "monthly" {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Invalid period '{}'. Use: daily or monthly", period),
            }),
        ));
    }

    let generation = state.store.current().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "No analytics generation published yet".to_string(),
            }),
        )
    })?;

    let total_revenue: Decimal = generation.daily_metrics.iter().map(|m| m.revenue).sum();
    let total_transactions: u64 = generation
        .daily_metrics
        .iter()
        .map(|m| m.transaction_count)
        .sum();
    let purchasing_customers = generation.customer_summaries.len() as u64;
    let revenue_per_customer = if purchasing_customers == 0 {
        None
    } else {
        (total_revenue / Decimal::from(purchasing_customers))
            .round_dp(2)
            .to_f64()
    };

    let rows = match period.as_str() {
        "daily" => RevenueRows::Daily(generation.daily_metrics.iter().map(Into::into).collect()),
        _ => RevenueRows::Monthly(generation.monthly_trends.iter().map(Into::into).collect()),
    };

    tracing::debug!(
        "Serving {} revenue analytics from generation {}",
        period,
        generation.generation_id
    );

    Ok(Json(RevenueAnalyticsResponse {
        period,
        total_revenue: total_revenue.round_dp(2).to_f64().unwrap_or_default(),
        total_transactions,
        revenue_per_customer,
        rows,
        category_shares: generation.category_shares.iter().map(Into::into).collect(),
        payment_method_shares: generation
            .payment_method_shares
            .iter()
            .map(Into::into)
            .collect(),
    }))
}
