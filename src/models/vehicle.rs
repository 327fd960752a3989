//! Vehicle model and related types

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::VehicleStatus;

/// Vehicle model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Vehicle {
    pub id: i64,
    pub model: String,
    /// License plate, stored upper-cased and unique
    pub plate: String,
    pub status: VehicleStatus,
    pub daily_rate: f64,
}

/// Vehicle joined to its current active rental (if any), one row per vehicle
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct VehicleWithRental {
    pub id: i64,
    pub model: String,
    pub plate: String,
    pub status: VehicleStatus,
    pub daily_rate: f64,
    pub rental_id: Option<i64>,
    pub customer_name: Option<String>,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
}

/// Register vehicle request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateVehicle {
    #[validate(length(min = 1, message = "Model is required"))]
    pub model: String,
    /// License plate; normalized to uppercase before storage
    #[validate(length(min = 1, message = "Plate is required"))]
    pub plate: String,
    #[validate(range(min = 0.0, message = "Daily rate cannot be negative"))]
    pub daily_rate: f64,
}

/// Manual vehicle status change request (maintenance toggle)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVehicleStatus {
    pub status: VehicleStatus,
}
