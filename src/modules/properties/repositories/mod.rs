pub mod property_repository;
pub mod rental_repository;

pub use property_repository::PropertyRepository;
pub use rental_repository::RentalRepository;
