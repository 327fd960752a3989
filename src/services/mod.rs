//! Business logic services

pub mod finance;
pub mod rentals;
pub mod stats;
pub mod vehicles;

use crate::{error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub vehicles: vehicles::VehiclesService,
    pub rentals: rentals::RentalsService,
    pub finance: finance::FinanceService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            vehicles: vehicles::VehiclesService::new(repository.clone()),
            rentals: rentals::RentalsService::new(repository.clone()),
            finance: finance::FinanceService::new(repository.clone()),
            stats: stats::StatsService::new(repository),
        }
    }
}

/// Run the lifecycle reconciler against the wall clock. Invoked by every
/// read path that displays fleet, agenda or finance state, so staleness is
/// bounded by the time since the last query rather than by a timer.
pub(crate) async fn reconcile_now(repository: &Repository) -> AppResult<u64> {
    let now = chrono::Local::now().naive_local();
    let reconciled = repository.rentals.reconcile_expired(now).await?;
    if reconciled > 0 {
        tracing::info!("Auto-completed {} overdue paid rentals", reconciled);
    }
    Ok(reconciled)
}
