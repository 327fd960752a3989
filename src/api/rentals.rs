//! Rental booking endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RentalStatus,
        rental::{CreateRental, RecordPayment, Rental, RentalDetails, UpdateRental},
    },
    services::finance::ChargeMessage,
    AppState,
};

/// Query parameters for the rental history listing
#[derive(Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Filter by lifecycle status
    pub status: Option<RentalStatus>,
    /// Period start (requires `to`)
    pub from: Option<NaiveDate>,
    /// Period end (requires `from`)
    pub to: Option<NaiveDate>,
}

/// Reconciler run response
#[derive(Serialize, ToSchema)]
pub struct ReconcileResponse {
    /// Number of overdue paid rentals that were auto-completed
    pub reconciled: u64,
}

/// Create a new rental booking
#[utoipa::path(
    post,
    path = "/rentals",
    tag = "rentals",
    request_body = CreateRental,
    responses(
        (status = 201, description = "Rental created", body = Rental),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Vehicle not found"),
        (status = 422, description = "Vehicle already rented for that period")
    )
)]
pub async fn create_rental(
    State(state): State<AppState>,
    Json(request): Json<CreateRental>,
) -> AppResult<(StatusCode, Json<Rental>)> {
    let rental = state.services.rentals.create(request).await?;
    Ok((StatusCode::CREATED, Json(rental)))
}

/// Rental history, optionally filtered by status or period
#[utoipa::path(
    get,
    path = "/rentals",
    tag = "rentals",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Rentals with vehicle details, newest first", body = Vec<RentalDetails>)
    )
)]
pub async fn list_rentals(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<RentalDetails>>> {
    let period = match (query.from, query.to) {
        (Some(from), Some(to)) => Some((from, to)),
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(
                "Both from and to are required for a period filter".to_string(),
            ))
        }
    };

    let rentals = state.services.rentals.history(query.status, period).await?;
    Ok(Json(rentals))
}

/// Get a rental with its vehicle details
#[utoipa::path(
    get,
    path = "/rentals/{id}",
    tag = "rentals",
    params(("id" = i64, Path, description = "Rental ID")),
    responses(
        (status = 200, description = "Rental details", body = RentalDetails),
        (status = 404, description = "Rental not found")
    )
)]
pub async fn get_rental(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<RentalDetails>> {
    let rental = state.services.rentals.get_details(id).await?;
    Ok(Json(rental))
}

/// Edit a rental's customer fields and date range
#[utoipa::path(
    put,
    path = "/rentals/{id}",
    tag = "rentals",
    params(("id" = i64, Path, description = "Rental ID")),
    request_body = UpdateRental,
    responses(
        (status = 200, description = "Updated rental", body = Rental),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Rental not found")
    )
)]
pub async fn update_rental(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateRental>,
) -> AppResult<Json<Rental>> {
    let rental = state.services.rentals.update(id, request).await?;
    Ok(Json(rental))
}

/// Cancel a rental
#[utoipa::path(
    post,
    path = "/rentals/{id}/cancel",
    tag = "rentals",
    params(("id" = i64, Path, description = "Rental ID")),
    responses(
        (status = 200, description = "Cancelled rental", body = Rental),
        (status = 404, description = "Rental not found"),
        (status = 422, description = "Rental already completed or cancelled")
    )
)]
pub async fn cancel_rental(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Rental>> {
    let rental = state.services.rentals.cancel(id).await?;
    Ok(Json(rental))
}

/// Finish a rental manually
#[utoipa::path(
    post,
    path = "/rentals/{id}/complete",
    tag = "rentals",
    params(("id" = i64, Path, description = "Rental ID")),
    responses(
        (status = 200, description = "Completed rental", body = Rental),
        (status = 404, description = "Rental not found"),
        (status = 422, description = "Rental already completed or cancelled")
    )
)]
pub async fn complete_rental(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Rental>> {
    let rental = state.services.rentals.complete(id).await?;
    Ok(Json(rental))
}

/// Record a payment against a rental
#[utoipa::path(
    post,
    path = "/rentals/{id}/payment",
    tag = "rentals",
    params(("id" = i64, Path, description = "Rental ID")),
    request_body = RecordPayment,
    responses(
        (status = 200, description = "Rental with payment recorded", body = Rental),
        (status = 400, description = "Invalid amount"),
        (status = 404, description = "Rental not found")
    )
)]
pub async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<RecordPayment>,
) -> AppResult<Json<Rental>> {
    let rental = state.services.rentals.record_payment(id, request).await?;
    Ok(Json(rental))
}

/// Payment reminder data for a rental (for external WhatsApp/dialer links)
#[utoipa::path(
    get,
    path = "/rentals/{id}/charge-message",
    tag = "rentals",
    params(("id" = i64, Path, description = "Rental ID")),
    responses(
        (status = 200, description = "Reminder text and deep-link data", body = ChargeMessage),
        (status = 404, description = "Rental not found")
    )
)]
pub async fn charge_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ChargeMessage>> {
    let message = state.services.finance.charge_message(id).await?;
    Ok(Json(message))
}

/// Run the lifecycle reconciler explicitly
#[utoipa::path(
    post,
    path = "/reconcile",
    tag = "rentals",
    responses(
        (status = 200, description = "Reconciler run", body = ReconcileResponse)
    )
)]
pub async fn reconcile(State(state): State<AppState>) -> AppResult<Json<ReconcileResponse>> {
    let reconciled = state.services.rentals.reconcile().await?;
    Ok(Json(ReconcileResponse { reconciled }))
}
