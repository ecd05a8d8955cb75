//! Business logic services

pub mod catalog;
pub mod ledger;
pub mod users;

use crate::{
    config::LedgerConfig,
    error::{AppError, AppResult},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub users: users::UsersService,
    pub ledger: ledger::LedgerService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, ledger_config: LedgerConfig) -> Self {
        let policy = ledger_config.stock_policy;
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), policy),
            ledger: ledger::LedgerService::new(repository.clone(), policy),
            repository,
        }
    }

    /// Check database connectivity
    pub async fn check_database(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}

/// Reject edit requests whose body id disagrees with the route id
pub(crate) fn ensure_matching_id(route_id: i32, body_id: Option<i32>) -> AppResult<()> {
    match body_id {
        Some(body_id) if body_id != route_id => Err(AppError::BadRequest(format!(
            "Route id {} does not match submitted id {}",
            route_id, body_id
        ))),
        _ => Ok(()),
    }
}
