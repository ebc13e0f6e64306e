pub mod controllers;
pub mod services;

pub use services::{
    AuthorizationInfo, ChargeSession, ChargeStatus, ChargeVerification, CustomerInfo,
    InitializeChargeRequest, PaymentGateway, PaystackClient,
};
