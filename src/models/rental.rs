//! Rental (booking) model and related types

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::{AgendaKind, PaymentMethod, PaymentStatus, RentalStatus};

/// Rental model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Rental {
    pub id: i64,
    pub vehicle_id: i64,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    pub status: RentalStatus,
    /// Per-day price captured from the vehicle at creation time; immune to
    /// later changes of the vehicle's current rate
    pub daily_rate: f64,
    pub day_count: i64,
    pub total_amount: f64,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub payment_date: Option<NaiveDate>,
    /// Amount actually received; may differ from `total_amount`
    pub amount_received: Option<f64>,
}

/// Rental joined with its vehicle for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RentalDetails {
    pub id: i64,
    pub vehicle_id: i64,
    pub vehicle_model: String,
    pub vehicle_plate: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    pub status: RentalStatus,
    pub daily_rate: f64,
    pub day_count: i64,
    pub total_amount: f64,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub payment_date: Option<NaiveDate>,
    pub amount_received: Option<f64>,
}

/// Rental entry in the daily agenda, tagged by how it touches the day
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AgendaEntry {
    pub id: i64,
    pub vehicle_model: String,
    pub vehicle_plate: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub kind: AgendaKind,
}

/// Create rental request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRental {
    pub vehicle_id: i64,
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    /// Create the rental even if it overlaps another active rental for the
    /// same vehicle
    #[serde(default)]
    pub force: bool,
}

/// Edit rental request. Recomputes day count and total from the original
/// rate snapshot; status and vehicle assignment are untouched.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRental {
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
}

/// Record payment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordPayment {
    pub method: PaymentMethod,
    #[validate(range(min = 0.01, message = "Amount received must be positive"))]
    pub amount_received: f64,
}

/// Number of billable days for a date range: whole days between the two
/// dates, with a same-day rental counting as one day.
pub fn rental_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().max(1)
}
