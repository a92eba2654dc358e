//! Target Router
//!
//! Real-time traffic routing: publishers submit visitor events and the
//! service picks the best-paying registered target whose accept rules cover
//! the visitor, within that target's daily acceptance cap.

use std::sync::Arc;

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
