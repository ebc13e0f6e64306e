pub mod models;
pub mod repositories;

pub use models::{Property, PropertyStatus, Rental};
pub use repositories::{PropertyRepository, RentalRepository};
