pub mod auto_debit_scheduler;
pub mod payment_processor;
pub mod settlement_service;
pub mod subject_effects;

pub use auto_debit_scheduler::{
    sweep_action, AutoDebitScheduler, LogReminderNotifier, ReminderNotifier, SweepAction,
};
pub use payment_processor::{PaymentOption, PaymentProcessor, PaymentRequest, ProcessOutcome};
pub use settlement_service::{
    duplicate_delivery_outcome, funding_applied, SettlementOutcome, SettlementService,
    WebhookOutcome,
};
pub use subject_effects::{SubjectEffect, SubjectEffectApplier};
