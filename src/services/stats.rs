//! General statistics service

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::enums::{RentalStatus, VehicleStatus},
    repository::Repository,
};

/// Rental counts by lifecycle status
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct RentalCounts {
    pub total: i64,
    pub active: i64,
    pub completed: i64,
    pub cancelled: i64,
}

/// Fleet counts by vehicle status
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct FleetCounts {
    pub total: i64,
    pub available: i64,
    pub rented: i64,
    pub maintenance: i64,
}

/// Combined statistics response
#[derive(Debug, Serialize, ToSchema)]
pub struct GeneralStats {
    pub rentals: RentalCounts,
    pub fleet: FleetCounts,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Rental and fleet counts
    pub async fn general(&self) -> AppResult<GeneralStats> {
        super::reconcile_now(&self.repository).await?;

        let mut rentals = RentalCounts {
            total: self.repository.rentals.count_all().await?,
            ..Default::default()
        };
        for (status, count) in self.repository.rentals.count_by_status().await? {
            match status {
                RentalStatus::Active => rentals.active = count,
                RentalStatus::Completed => rentals.completed = count,
                RentalStatus::Cancelled => rentals.cancelled = count,
            }
        }

        let mut fleet = FleetCounts::default();
        for (status, count) in self.repository.vehicles.count_by_status().await? {
            fleet.total += count;
            match status {
                VehicleStatus::Available => fleet.available = count,
                VehicleStatus::Rented => fleet.rented = count,
                VehicleStatus::Maintenance => fleet.maintenance = count,
            }
        }

        Ok(GeneralStats { rentals, fleet })
    }
}
