pub mod installment;
pub mod investment_category;
pub mod payment;
pub mod payment_metadata;
pub mod stored_payment_method;

pub use installment::{BillingFrequency, Installment, InstallmentStatus};
pub use investment_category::InvestmentCategory;
pub use payment::{Payment, PaymentStatus};
pub use payment_metadata::PaymentMetadata;
pub use stored_payment_method::StoredPaymentMethod;
