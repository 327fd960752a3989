//! Rental booking service: commands, lifecycle reconciliation and the
//! agenda/calendar read paths

use chrono::{Datelike, NaiveDate};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RentalStatus,
        rental::{AgendaEntry, CreateRental, RecordPayment, Rental, RentalDetails, UpdateRental},
    },
    repository::Repository,
};

/// First and last day of a calendar month
pub fn month_range(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}

/// First and last day of the month containing `date`
pub fn month_range_of(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    // Both bounds exist for any valid date
    month_range(date.year(), date.month()).unwrap_or((date, date))
}

#[derive(Clone)]
pub struct RentalsService {
    repository: Repository,
}

impl RentalsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    fn check_range(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
        if end < start {
            return Err(AppError::Validation(
                "End date cannot be before start date".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a rental booking
    pub async fn create(&self, rental: CreateRental) -> AppResult<Rental> {
        rental
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        Self::check_range(rental.start_date, rental.end_date)?;

        self.repository.rentals.create(&rental).await
    }

    /// Get a rental with its vehicle details
    pub async fn get_details(&self, id: i64) -> AppResult<RentalDetails> {
        self.repository.rentals.get_details(id).await
    }

    /// Edit an existing rental
    pub async fn update(&self, id: i64, update: UpdateRental) -> AppResult<Rental> {
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        Self::check_range(update.start_date, update.end_date)?;

        self.repository.rentals.update(id, &update).await
    }

    /// Cancel a rental
    pub async fn cancel(&self, id: i64) -> AppResult<Rental> {
        self.repository.rentals.cancel(id).await
    }

    /// Finish a rental manually, regardless of payment state
    pub async fn complete(&self, id: i64) -> AppResult<Rental> {
        self.repository.rentals.complete(id).await
    }

    /// Record a payment against a rental
    pub async fn record_payment(&self, id: i64, payment: RecordPayment) -> AppResult<Rental> {
        payment
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let today = chrono::Local::now().date_naive();
        self.repository
            .rentals
            .record_payment(id, payment.method, payment.amount_received, today)
            .await
    }

    /// Run the lifecycle reconciler against the wall clock
    pub async fn reconcile(&self) -> AppResult<u64> {
        super::reconcile_now(&self.repository).await
    }

    /// Agenda for one day, reconciled first
    pub async fn agenda(&self, date: NaiveDate) -> AppResult<Vec<AgendaEntry>> {
        super::reconcile_now(&self.repository).await?;
        self.repository.rentals.agenda_for(date).await
    }

    /// Calendar for one month: every rental overlapping it
    pub async fn calendar(&self, year: i32, month: u32) -> AppResult<Vec<RentalDetails>> {
        let (first, last) = month_range(year, month)
            .ok_or_else(|| AppError::Validation(format!("Invalid month {}-{}", year, month)))?;

        super::reconcile_now(&self.repository).await?;
        self.repository.rentals.list_for_range(first, last).await
    }

    /// Rental history, optionally filtered by status and/or period
    pub async fn history(
        &self,
        status: Option<RentalStatus>,
        period: Option<(NaiveDate, NaiveDate)>,
    ) -> AppResult<Vec<RentalDetails>> {
        super::reconcile_now(&self.repository).await?;

        match (status, period) {
            (Some(status), Some((from, to))) => {
                self.repository
                    .rentals
                    .list_by_status_in_period(status, from, to)
                    .await
            }
            (Some(status), None) => self.repository.rentals.list_by_status(status).await,
            (None, Some((from, to))) => self.repository.rentals.list_by_period(from, to).await,
            (None, None) => self.repository.rentals.list_all().await,
        }
    }
}
