pub mod gateways;
pub mod health;
pub mod payments;
pub mod properties;
pub mod users;
pub mod wallets;
