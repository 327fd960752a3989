//! Daily agenda and monthly calendar endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::rental::{AgendaEntry, RentalDetails},
    AppState,
};

/// Agenda for one day: pickups and returns among active rentals
#[utoipa::path(
    get,
    path = "/agenda/{date}",
    tag = "agenda",
    params(("date" = NaiveDate, Path, description = "Day to display (YYYY-MM-DD)")),
    responses(
        (status = 200, description = "Active rentals touching the day, ordered by start time", body = Vec<AgendaEntry>)
    )
)]
pub async fn daily_agenda(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<Vec<AgendaEntry>>> {
    let agenda = state.services.rentals.agenda(date).await?;
    Ok(Json(agenda))
}

/// Calendar for one month: every rental overlapping it, any status
#[utoipa::path(
    get,
    path = "/calendar/{year}/{month}",
    tag = "agenda",
    params(
        ("year" = i32, Path, description = "Calendar year"),
        ("month" = u32, Path, description = "Calendar month (1-12)")
    ),
    responses(
        (status = 200, description = "Rentals overlapping the month", body = Vec<RentalDetails>),
        (status = 400, description = "Invalid month")
    )
)]
pub async fn monthly_calendar(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> AppResult<Json<Vec<RentalDetails>>> {
    let rentals = state.services.rentals.calendar(year, month).await?;
    Ok(Json(rentals))
}
