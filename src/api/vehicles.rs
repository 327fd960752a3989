//! Vehicle management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::vehicle::{CreateVehicle, UpdateVehicleStatus, Vehicle, VehicleWithRental},
    AppState,
};

/// Query parameters for the availability listing
#[derive(Deserialize, IntoParams)]
pub struct AvailableQuery {
    /// Date to check, defaults to today
    pub date: Option<NaiveDate>,
}

/// List bookable vehicles
#[utoipa::path(
    get,
    path = "/vehicles",
    tag = "vehicles",
    responses(
        (status = 200, description = "Vehicles not in maintenance", body = Vec<Vehicle>)
    )
)]
pub async fn list_vehicles(State(state): State<AppState>) -> AppResult<Json<Vec<Vehicle>>> {
    let vehicles = state.services.vehicles.list().await?;
    Ok(Json(vehicles))
}

/// Register a new vehicle
#[utoipa::path(
    post,
    path = "/vehicles",
    tag = "vehicles",
    request_body = CreateVehicle,
    responses(
        (status = 201, description = "Vehicle registered", body = Vehicle),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Plate already registered")
    )
)]
pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicle>,
) -> AppResult<(StatusCode, Json<Vehicle>)> {
    let vehicle = state.services.vehicles.register(request).await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// Vehicles free to rent on a date
#[utoipa::path(
    get,
    path = "/vehicles/available",
    tag = "vehicles",
    params(AvailableQuery),
    responses(
        (status = 200, description = "Vehicles without an active rental covering the date", body = Vec<Vehicle>)
    )
)]
pub async fn available_vehicles(
    State(state): State<AppState>,
    Query(query): Query<AvailableQuery>,
) -> AppResult<Json<Vec<Vehicle>>> {
    let date = query.date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let vehicles = state.services.vehicles.available_on(date).await?;
    Ok(Json(vehicles))
}

/// Fleet listing with live rental status
#[utoipa::path(
    get,
    path = "/vehicles/fleet",
    tag = "vehicles",
    responses(
        (status = 200, description = "All vehicles with their current active rental", body = Vec<VehicleWithRental>)
    )
)]
pub async fn fleet(State(state): State<AppState>) -> AppResult<Json<Vec<VehicleWithRental>>> {
    let fleet = state.services.vehicles.fleet().await?;
    Ok(Json(fleet))
}

/// Get a single vehicle
#[utoipa::path(
    get,
    path = "/vehicles/{id}",
    tag = "vehicles",
    params(("id" = i64, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle", body = Vehicle),
        (status = 404, description = "Vehicle not found")
    )
)]
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vehicle>> {
    let vehicle = state.services.vehicles.get(id).await?;
    Ok(Json(vehicle))
}

/// Manually change a vehicle's status (maintenance toggle)
#[utoipa::path(
    put,
    path = "/vehicles/{id}/status",
    tag = "vehicles",
    params(("id" = i64, Path, description = "Vehicle ID")),
    request_body = UpdateVehicleStatus,
    responses(
        (status = 200, description = "Updated vehicle", body = Vehicle),
        (status = 404, description = "Vehicle not found")
    )
)]
pub async fn update_vehicle_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateVehicleStatus>,
) -> AppResult<Json<Vehicle>> {
    let vehicle = state.services.vehicles.set_status(id, request.status).await?;
    Ok(Json(vehicle))
}
