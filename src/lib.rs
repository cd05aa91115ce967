//! Slotkeeper scheduling server
//!
//! Multi-tenant appointment booking and staff scheduling engine, exposed as
//! a REST JSON API: bookings and free slots, weekly templates, shifts,
//! time off, conflict detection and availability auditing.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod scheduling;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
