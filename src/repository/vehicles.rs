//! Vehicles repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::VehicleStatus,
        vehicle::{CreateVehicle, Vehicle, VehicleWithRental},
    },
};

#[derive(Clone)]
pub struct VehiclesRepository {
    pool: Pool<Sqlite>,
}

impl VehiclesRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get vehicle by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Vehicle> {
        sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::VehicleNotFound(id))
    }

    /// Register a new vehicle. The plate is stored upper-cased; a duplicate
    /// plate surfaces as a conflict without creating a row.
    pub async fn create(&self, vehicle: &CreateVehicle) -> AppResult<Vehicle> {
        let plate = vehicle.plate.trim().to_uppercase();

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO vehicles (model, plate, status, daily_rate)
            VALUES (?, ?, 'available', ?)
            RETURNING id
            "#,
        )
        .bind(vehicle.model.trim())
        .bind(&plate)
        .bind(vehicle.daily_rate)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("A vehicle with plate {} already exists", plate))
            }
            _ => AppError::Database(e),
        })?;

        self.get_by_id(id).await
    }

    /// List bookable vehicles (everything not flagged for maintenance)
    pub async fn list_bookable(&self) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE status != 'maintenance' ORDER BY model",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    /// Fleet listing: every vehicle left-joined to its current active rental,
    /// one row per vehicle (the soonest-ending active rental when several
    /// overlap)
    pub async fn list_with_active_rental(&self) -> AppResult<Vec<VehicleWithRental>> {
        let fleet = sqlx::query_as::<_, VehicleWithRental>(
            r#"
            SELECT v.id, v.model, v.plate, v.status, v.daily_rate,
                   r.id AS rental_id, r.customer_name, r.end_date, r.end_time
            FROM vehicles v
            LEFT JOIN rentals r ON r.id = (
                SELECT id FROM rentals
                WHERE vehicle_id = v.id AND status = 'active'
                ORDER BY end_date, end_time
                LIMIT 1
            )
            ORDER BY v.model
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(fleet)
    }

    /// Vehicles free to rent on a given date: no active rental covering the
    /// date and not in maintenance
    pub async fn available_on(&self, date: NaiveDate) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE status != 'maintenance'
              AND id NOT IN (
                  SELECT vehicle_id FROM rentals
                  WHERE status = 'active'
                    AND start_date <= ? AND end_date >= ?
              )
            ORDER BY model
            "#,
        )
        .bind(date)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    /// Manually set a vehicle's status (maintenance toggle)
    pub async fn set_status(&self, id: i64, status: VehicleStatus) -> AppResult<Vehicle> {
        let result = sqlx::query("UPDATE vehicles SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::VehicleNotFound(id));
        }

        self.get_by_id(id).await
    }

    /// Fleet counts by status
    pub async fn count_by_status(&self) -> AppResult<Vec<(VehicleStatus, i64)>> {
        let counts = sqlx::query_as::<_, (VehicleStatus, i64)>(
            "SELECT status, COUNT(*) FROM vehicles GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}
