//! Data models for Locar

pub mod enums;
pub mod rental;
pub mod vehicle;

// Re-export commonly used types
pub use enums::{AgendaKind, PaymentMethod, PaymentStatus, RentalStatus, VehicleStatus};
pub use rental::{AgendaEntry, Rental, RentalDetails};
pub use vehicle::{Vehicle, VehicleWithRental};
