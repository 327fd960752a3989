//! Statistics endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, services::stats::GeneralStats, AppState};

/// Rental and fleet counts
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "General statistics", body = GeneralStats)
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> AppResult<Json<GeneralStats>> {
    let stats = state.services.stats.general().await?;
    Ok(Json(stats))
}
