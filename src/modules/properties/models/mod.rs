pub mod property;
pub mod rental;

pub use property::{Property, PropertyStatus};
pub use rental::Rental;
