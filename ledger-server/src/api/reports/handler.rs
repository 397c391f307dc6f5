//! Analytics API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::api::params;
use crate::core::ServerState;
use crate::db::repository::{customer, purchase};
use crate::reports::analysis::{self, MonthlyLoyaltyAnalysis, SalesSummary, SalesTrends};
use crate::utils::AppResult;

/// GET /api/reports/summary
pub async fn summary(State(state): State<ServerState>) -> AppResult<Json<SalesSummary>> {
    let customers = customer::find_all_with_inactive(&state.pool).await?;
    let purchases = purchase::find_all(&state.pool, None, None).await?;
    Ok(Json(analysis::sales_summary(
        &customers,
        &purchases,
        state.timezone(),
    )))
}

#[derive(Debug, Deserialize)]
pub struct MonthlyLoyaltyQuery {
    pub min_amount: Option<String>,
}

/// GET /api/reports/loyalty/monthly?min_amount=
pub async fn monthly_loyalty(
    State(state): State<ServerState>,
    Query(query): Query<MonthlyLoyaltyQuery>,
) -> AppResult<Json<MonthlyLoyaltyAnalysis>> {
    let threshold =
        params::min_amount(query.min_amount.as_deref(), state.config.loyalty_min_amount);
    let customers = customer::find_all_with_inactive(&state.pool).await?;
    let purchases = purchase::find_all(&state.pool, None, None).await?;
    Ok(Json(analysis::monthly_loyalty(
        &customers,
        &purchases,
        threshold,
        state.timezone(),
    )))
}

/// GET /api/reports/trends
pub async fn trends(State(state): State<ServerState>) -> AppResult<Json<SalesTrends>> {
    let purchases = purchase::find_all(&state.pool, None, None).await?;
    Ok(Json(analysis::sales_trends(&purchases, state.timezone())))
}
