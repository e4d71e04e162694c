//! # DIDECO Common Library
//!
//! Shared code for the DIDECO social-assistance services:
//! - Database schema, seed data and settings
//! - Domain models and wire types
//! - Stock criticality rules
//! - Configuration loading
//! - Error types

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod stock;

pub use error::{Error, Result};
pub use stock::{is_critical, ManualStatus};
