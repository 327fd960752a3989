//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{agenda, finance, health, rentals, stats, vehicles};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Locar API",
        version = "1.0.0",
        description = "Car Rental Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Vehicles
        vehicles::list_vehicles,
        vehicles::create_vehicle,
        vehicles::available_vehicles,
        vehicles::fleet,
        vehicles::get_vehicle,
        vehicles::update_vehicle_status,
        // Rentals
        rentals::create_rental,
        rentals::list_rentals,
        rentals::get_rental,
        rentals::update_rental,
        rentals::cancel_rental,
        rentals::complete_rental,
        rentals::record_payment,
        rentals::charge_message,
        rentals::reconcile,
        // Agenda
        agenda::daily_agenda,
        agenda::monthly_calendar,
        // Finance
        finance::summary,
        finance::pending_charges,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Vehicles
            crate::models::vehicle::Vehicle,
            crate::models::vehicle::VehicleWithRental,
            crate::models::vehicle::CreateVehicle,
            crate::models::vehicle::UpdateVehicleStatus,
            // Rentals
            crate::models::rental::Rental,
            crate::models::rental::RentalDetails,
            crate::models::rental::AgendaEntry,
            crate::models::rental::CreateRental,
            crate::models::rental::UpdateRental,
            crate::models::rental::RecordPayment,
            rentals::ReconcileResponse,
            // Enums
            crate::models::enums::VehicleStatus,
            crate::models::enums::RentalStatus,
            crate::models::enums::PaymentStatus,
            crate::models::enums::PaymentMethod,
            crate::models::enums::AgendaKind,
            // Finance
            crate::services::finance::FinancialSummary,
            crate::services::finance::ChargeMessage,
            // Stats
            crate::services::stats::GeneralStats,
            crate::services::stats::RentalCounts,
            crate::services::stats::FleetCounts,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "vehicles", description = "Vehicle fleet management"),
        (name = "rentals", description = "Rental booking management"),
        (name = "agenda", description = "Daily agenda and monthly calendar"),
        (name = "finance", description = "Financial summaries"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
