//! Financial summary endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::rental::RentalDetails,
    services::finance::FinancialSummary,
    AppState,
};

/// Revenue summary: total, pending and current-month figures
#[utoipa::path(
    get,
    path = "/finance/summary",
    tag = "finance",
    responses(
        (status = 200, description = "Revenue summary", body = FinancialSummary)
    )
)]
pub async fn summary(State(state): State<AppState>) -> AppResult<Json<FinancialSummary>> {
    let summary = state.services.finance.summary().await?;
    Ok(Json(summary))
}

/// Active rentals still waiting for payment
#[utoipa::path(
    get,
    path = "/finance/pending",
    tag = "finance",
    responses(
        (status = 200, description = "Payment-pending active rentals", body = Vec<RentalDetails>)
    )
)]
pub async fn pending_charges(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<RentalDetails>>> {
    let rentals = state.services.finance.pending_charges().await?;
    Ok(Json(rentals))
}
