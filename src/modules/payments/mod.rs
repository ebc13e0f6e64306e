pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{
    BillingFrequency, Installment, InstallmentStatus, InvestmentCategory, Payment,
    PaymentMetadata, PaymentStatus, StoredPaymentMethod,
};
pub use repositories::{InstallmentRepository, PaymentRepository, StoredMethodRepository};
pub use services::{
    AutoDebitScheduler, PaymentProcessor, PaymentRequest, ProcessOutcome, SettlementOutcome,
    SettlementService, WebhookOutcome,
};
