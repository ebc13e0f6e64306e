pub mod installment_repository;
pub mod payment_repository;
pub mod stored_method_repository;

pub use installment_repository::InstallmentRepository;
pub use payment_repository::PaymentRepository;
pub use stored_method_repository::StoredMethodRepository;
