//! API handlers for Locar REST endpoints

pub mod agenda;
pub mod finance;
pub mod health;
pub mod openapi;
pub mod rentals;
pub mod stats;
pub mod vehicles;
