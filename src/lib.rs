//! Book Lending Server
//!
//! A REST JSON API for librarians managing a book catalog, genres,
//! registered users, and the borrow/return ledger that keeps each
//! book's stock in line with its loans.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}
