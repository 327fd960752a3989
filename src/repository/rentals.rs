//! Rentals repository for database operations.
//!
//! Commands that touch both tables (create, cancel, complete, reconcile) run
//! inside a transaction so the rental row and the vehicle status cache can
//! never diverge on a crash between statements.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{Pool, Sqlite, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{PaymentMethod, RentalStatus},
        rental::{rental_days, AgendaEntry, CreateRental, Rental, RentalDetails, UpdateRental},
    },
};

const DETAILS_SELECT: &str = r#"
    SELECT r.id, r.vehicle_id, v.model AS vehicle_model, v.plate AS vehicle_plate,
           r.customer_name, r.customer_phone,
           r.start_date, r.start_time, r.end_date, r.end_time,
           r.status, r.daily_rate, r.day_count, r.total_amount,
           r.payment_method, r.payment_status, r.payment_date, r.amount_received
    FROM rentals r
    JOIN vehicles v ON r.vehicle_id = v.id
"#;

#[derive(Clone)]
pub struct RentalsRepository {
    pool: Pool<Sqlite>,
}

impl RentalsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get rental by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Rental> {
        sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::RentalNotFound(id))
    }

    /// Get rental with vehicle details
    pub async fn get_details(&self, id: i64) -> AppResult<RentalDetails> {
        sqlx::query_as::<_, RentalDetails>(&format!("{} WHERE r.id = ?", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::RentalNotFound(id))
    }

    /// Create a new rental.
    ///
    /// Snapshots the vehicle's current daily rate, computes the day count and
    /// total, inserts the rental as active/pending and marks the vehicle
    /// rented. A window overlapping another active rental for the same
    /// vehicle is rejected unless `force` is set.
    pub async fn create(&self, rental: &CreateRental) -> AppResult<Rental> {
        let mut tx = self.pool.begin().await?;

        let daily_rate = sqlx::query_scalar::<_, f64>("SELECT daily_rate FROM vehicles WHERE id = ?")
            .bind(rental.vehicle_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::VehicleNotFound(rental.vehicle_id))?;

        let overlapping: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM rentals
                WHERE vehicle_id = ? AND status = 'active'
                  AND start_date <= ? AND end_date >= ?
            )
            "#,
        )
        .bind(rental.vehicle_id)
        .bind(rental.end_date)
        .bind(rental.start_date)
        .fetch_one(&mut *tx)
        .await?;

        if overlapping && !rental.force {
            return Err(AppError::BusinessRule(
                "Vehicle already has an active rental in that period".to_string(),
            ));
        }

        let day_count = rental_days(rental.start_date, rental.end_date);
        let total_amount = daily_rate * day_count as f64;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO rentals (
                vehicle_id, customer_name, customer_phone,
                start_date, start_time, end_date, end_time,
                status, daily_rate, day_count, total_amount, payment_status
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, 'active', ?, ?, ?, 'pending')
            RETURNING id
            "#,
        )
        .bind(rental.vehicle_id)
        .bind(rental.customer_name.trim())
        .bind(&rental.customer_phone)
        .bind(rental.start_date)
        .bind(rental.start_time)
        .bind(rental.end_date)
        .bind(rental.end_time)
        .bind(daily_rate)
        .bind(day_count)
        .bind(total_amount)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE vehicles SET status = 'rented' WHERE id = ?")
            .bind(rental.vehicle_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Edit customer fields and the date/time range. Day count and total are
    /// recomputed from the rate snapshot taken at creation; the vehicle's
    /// current rate is never re-fetched.
    pub async fn update(&self, id: i64, update: &UpdateRental) -> AppResult<Rental> {
        let rental = self.get_by_id(id).await?;

        let day_count = rental_days(update.start_date, update.end_date);
        let total_amount = rental.daily_rate * day_count as f64;

        sqlx::query(
            r#"
            UPDATE rentals
            SET customer_name = ?, customer_phone = ?,
                start_date = ?, start_time = ?, end_date = ?, end_time = ?,
                day_count = ?, total_amount = ?
            WHERE id = ?
            "#,
        )
        .bind(update.customer_name.trim())
        .bind(&update.customer_phone)
        .bind(update.start_date)
        .bind(update.start_time)
        .bind(update.end_date)
        .bind(update.end_time)
        .bind(day_count)
        .bind(total_amount)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Cancel a rental and release its vehicle if nothing else holds it
    pub async fn cancel(&self, id: i64) -> AppResult<Rental> {
        self.close(id, RentalStatus::Cancelled).await
    }

    /// Mark a rental finished and release its vehicle if nothing else holds it
    pub async fn complete(&self, id: i64) -> AppResult<Rental> {
        self.close(id, RentalStatus::Completed).await
    }

    /// Shared active -> terminal transition
    async fn close(&self, id: i64, to: RentalStatus) -> AppResult<Rental> {
        let rental = self.get_by_id(id).await?;

        if rental.status != RentalStatus::Active {
            return Err(AppError::BusinessRule(format!(
                "Rental is already {}",
                rental.status
            )));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE rentals SET status = ? WHERE id = ?")
            .bind(to)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        Self::release_vehicle_if_free(&mut tx, rental.vehicle_id).await?;

        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Record a payment: method, today's date and the amount actually
    /// received (which may differ from the rental total). Rental status is
    /// unaffected.
    pub async fn record_payment(
        &self,
        id: i64,
        method: PaymentMethod,
        amount_received: f64,
        date: NaiveDate,
    ) -> AppResult<Rental> {
        let result = sqlx::query(
            r#"
            UPDATE rentals
            SET payment_status = 'paid', payment_method = ?,
                payment_date = ?, amount_received = ?
            WHERE id = ?
            "#,
        )
        .bind(method)
        .bind(date)
        .bind(amount_received)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::RentalNotFound(id));
        }

        self.get_by_id(id).await
    }

    /// Complete every active, paid rental whose return moment is behind
    /// `now`, releasing vehicles with no remaining active rental. Idempotent;
    /// returns the number of rentals transitioned.
    pub async fn reconcile_expired(&self, now: NaiveDateTime) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let expired = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT id, vehicle_id FROM rentals
            WHERE status = 'active' AND payment_status = 'paid'
              AND (end_date < ? OR (end_date = ? AND end_time < ?))
            "#,
        )
        .bind(now.date())
        .bind(now.date())
        .bind(now.time())
        .fetch_all(&mut *tx)
        .await?;

        for (rental_id, vehicle_id) in &expired {
            sqlx::query("UPDATE rentals SET status = 'completed' WHERE id = ?")
                .bind(rental_id)
                .execute(&mut *tx)
                .await?;

            Self::release_vehicle_if_free(&mut tx, *vehicle_id).await?;
        }

        tx.commit().await?;

        Ok(expired.len() as u64)
    }

    /// Set the vehicle back to available when it has no active rental left.
    /// Note: this also overwrites a manually-set maintenance flag, matching
    /// the historical behavior.
    async fn release_vehicle_if_free(
        tx: &mut Transaction<'_, Sqlite>,
        vehicle_id: i64,
    ) -> AppResult<()> {
        let remaining: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM rentals WHERE vehicle_id = ? AND status = 'active'",
        )
        .bind(vehicle_id)
        .fetch_one(&mut **tx)
        .await?;

        if remaining == 0 {
            sqlx::query("UPDATE vehicles SET status = 'available' WHERE id = ?")
                .bind(vehicle_id)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    // =========================================================================
    // Read-only aggregations
    // =========================================================================

    /// Daily agenda: active rentals starting or ending on the date, tagged
    /// pickup / return, ordered by start time
    pub async fn agenda_for(&self, date: NaiveDate) -> AppResult<Vec<AgendaEntry>> {
        let agenda = sqlx::query_as::<_, AgendaEntry>(
            r#"
            SELECT r.id, v.model AS vehicle_model, v.plate AS vehicle_plate,
                   r.customer_name, r.customer_phone,
                   r.start_date, r.start_time, r.end_date, r.end_time,
                   r.total_amount, r.payment_status,
                   CASE
                       WHEN r.start_date = ? THEN 'pickup'
                       WHEN r.end_date = ? THEN 'return'
                       ELSE 'ongoing'
                   END AS kind
            FROM rentals r
            JOIN vehicles v ON r.vehicle_id = v.id
            WHERE (r.start_date = ? OR r.end_date = ?) AND r.status = 'active'
            ORDER BY r.start_time
            "#,
        )
        .bind(date)
        .bind(date)
        .bind(date)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(agenda)
    }

    /// Monthly calendar: every rental overlapping [month_start, month_end],
    /// regardless of status
    pub async fn list_for_range(
        &self,
        month_start: NaiveDate,
        month_end: NaiveDate,
    ) -> AppResult<Vec<RentalDetails>> {
        let rentals = sqlx::query_as::<_, RentalDetails>(&format!(
            r#"
            {}
            WHERE (r.start_date BETWEEN ? AND ?)
               OR (r.end_date BETWEEN ? AND ?)
               OR (r.start_date <= ? AND r.end_date >= ?)
            ORDER BY r.start_date, r.start_time
            "#,
            DETAILS_SELECT
        ))
        .bind(month_start)
        .bind(month_end)
        .bind(month_start)
        .bind(month_end)
        .bind(month_start)
        .bind(month_end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rentals)
    }

    /// Full rental history, newest first
    pub async fn list_all(&self) -> AppResult<Vec<RentalDetails>> {
        let rentals = sqlx::query_as::<_, RentalDetails>(&format!(
            "{} ORDER BY r.start_date DESC, r.start_time DESC",
            DETAILS_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rentals)
    }

    /// Rental history filtered by lifecycle status
    pub async fn list_by_status(&self, status: RentalStatus) -> AppResult<Vec<RentalDetails>> {
        let rentals = sqlx::query_as::<_, RentalDetails>(&format!(
            "{} WHERE r.status = ? ORDER BY r.start_date DESC, r.start_time DESC",
            DETAILS_SELECT
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rentals)
    }

    /// Rentals fully contained in a period
    pub async fn list_by_period(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<RentalDetails>> {
        let rentals = sqlx::query_as::<_, RentalDetails>(&format!(
            "{} WHERE r.start_date >= ? AND r.end_date <= ? ORDER BY r.start_date DESC, r.start_time DESC",
            DETAILS_SELECT
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rentals)
    }

    /// Rentals of a given status fully contained in a period
    pub async fn list_by_status_in_period(
        &self,
        status: RentalStatus,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<RentalDetails>> {
        let rentals = sqlx::query_as::<_, RentalDetails>(&format!(
            "{} WHERE r.status = ? AND r.start_date >= ? AND r.end_date <= ? ORDER BY r.start_date DESC, r.start_time DESC",
            DETAILS_SELECT
        ))
        .bind(status)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rentals)
    }

    /// Active rentals still waiting for payment, for the charge list
    pub async fn list_pending_payment(&self) -> AppResult<Vec<RentalDetails>> {
        let rentals = sqlx::query_as::<_, RentalDetails>(&format!(
            r#"
            {}
            WHERE r.status = 'active' AND r.payment_status = 'pending'
            ORDER BY r.end_date, r.end_time
            "#,
            DETAILS_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rentals)
    }

    /// Total revenue: what was actually received over all paid rentals,
    /// falling back to the rental total when no received amount was recorded
    pub async fn total_revenue(&self) -> AppResult<f64> {
        let total: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(COALESCE(amount_received, total_amount)), 0.0)
            FROM rentals WHERE payment_status = 'paid'
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Pending revenue: totals of active rentals not yet paid
    pub async fn pending_revenue(&self) -> AppResult<f64> {
        let total: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_amount), 0.0)
            FROM rentals WHERE payment_status = 'pending' AND status = 'active'
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Paid revenue restricted to payments dated within [month_start, month_end]
    pub async fn revenue_between(
        &self,
        month_start: NaiveDate,
        month_end: NaiveDate,
    ) -> AppResult<f64> {
        let total: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(COALESCE(amount_received, total_amount)), 0.0)
            FROM rentals
            WHERE payment_status = 'paid' AND payment_date BETWEEN ? AND ?
            "#,
        )
        .bind(month_start)
        .bind(month_end)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Rental counts by lifecycle status
    pub async fn count_by_status(&self) -> AppResult<Vec<(RentalStatus, i64)>> {
        let counts = sqlx::query_as::<_, (RentalStatus, i64)>(
            "SELECT status, COUNT(*) FROM rentals GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Total number of rentals ever recorded
    pub async fn count_all(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rentals")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
