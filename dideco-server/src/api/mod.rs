//! HTTP API handlers for dideco-server

pub mod beneficiaries;
pub mod benefits;
pub mod dashboard;
pub mod deliveries;
pub mod error;
pub mod guard;
pub mod health;
pub mod inventory;
pub mod professionals;
pub mod session;
pub mod users;

pub use error::ApiError;
