pub mod gateway_trait;
pub mod paystack;

pub use gateway_trait::{
    AuthorizationInfo, ChargeSession, ChargeStatus, ChargeVerification, CustomerInfo,
    InitializeChargeRequest, PaymentGateway,
};
pub use paystack::{generate_reference, PaystackClient};
