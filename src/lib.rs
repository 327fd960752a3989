//! Locar Car Rental Management System
//!
//! A Rust implementation of the Locar rental-fleet backend, providing a REST
//! JSON API for managing vehicles, rental bookings, payments and financial
//! summaries over a local SQLite database.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repository: repository::Repository,
    pub services: Arc<services::Services>,
}
