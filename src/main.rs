//! Locar Server - Car Rental Management System
//!
//! A Rust REST API server for managing a car-rental fleet over a local
//! SQLite database.

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use locar_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("locar_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Locar Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool, creating the database file on first run
    let connect_options =
        SqliteConnectOptions::from_str(&config.database.url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(connect_options)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository.clone());

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        repository,
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(server_host.parse()?, server_port);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Vehicles
        .route("/vehicles", get(api::vehicles::list_vehicles))
        .route("/vehicles", post(api::vehicles::create_vehicle))
        .route("/vehicles/available", get(api::vehicles::available_vehicles))
        .route("/vehicles/fleet", get(api::vehicles::fleet))
        .route("/vehicles/:id", get(api::vehicles::get_vehicle))
        .route("/vehicles/:id/status", put(api::vehicles::update_vehicle_status))
        // Rentals
        .route("/rentals", post(api::rentals::create_rental))
        .route("/rentals", get(api::rentals::list_rentals))
        .route("/rentals/:id", get(api::rentals::get_rental))
        .route("/rentals/:id", put(api::rentals::update_rental))
        .route("/rentals/:id/cancel", post(api::rentals::cancel_rental))
        .route("/rentals/:id/complete", post(api::rentals::complete_rental))
        .route("/rentals/:id/payment", post(api::rentals::record_payment))
        .route("/rentals/:id/charge-message", get(api::rentals::charge_message))
        .route("/reconcile", post(api::rentals::reconcile))
        // Agenda & calendar
        .route("/agenda/:date", get(api::agenda::daily_agenda))
        .route("/calendar/:year/:month", get(api::agenda::monthly_calendar))
        // Finance
        .route("/finance/summary", get(api::finance::summary))
        .route("/finance/pending", get(api::finance::pending_charges))
        // Statistics
        .route("/stats", get(api::stats::get_stats))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
