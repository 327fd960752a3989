//! Vehicle fleet management service

use chrono::NaiveDate;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::VehicleStatus,
        vehicle::{CreateVehicle, Vehicle, VehicleWithRental},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct VehiclesService {
    repository: Repository,
}

impl VehiclesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new vehicle
    pub async fn register(&self, vehicle: CreateVehicle) -> AppResult<Vehicle> {
        vehicle
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository.vehicles.create(&vehicle).await
    }

    /// Get a vehicle by ID
    pub async fn get(&self, id: i64) -> AppResult<Vehicle> {
        self.repository.vehicles.get_by_id(id).await
    }

    /// List bookable vehicles (maintenance excluded)
    pub async fn list(&self) -> AppResult<Vec<Vehicle>> {
        self.repository.vehicles.list_bookable().await
    }

    /// Fleet listing with each vehicle's current active rental.
    /// Reconciles overdue rentals first so the displayed status is current.
    pub async fn fleet(&self) -> AppResult<Vec<VehicleWithRental>> {
        super::reconcile_now(&self.repository).await?;
        self.repository.vehicles.list_with_active_rental().await
    }

    /// Vehicles free to rent on the given date
    pub async fn available_on(&self, date: NaiveDate) -> AppResult<Vec<Vehicle>> {
        super::reconcile_now(&self.repository).await?;
        self.repository.vehicles.available_on(date).await
    }

    /// Manually change a vehicle's status (maintenance toggle)
    pub async fn set_status(&self, id: i64, status: VehicleStatus) -> AppResult<Vehicle> {
        self.repository.vehicles.set_status(id, status).await
    }
}
