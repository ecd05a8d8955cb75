//! User directory service

use validator::Validate;

use super::ensure_matching_id;
use crate::{
    error::AppResult,
    ledger::StockPolicy,
    models::user::{CreateUser, UpdateUser, User, UserDetails, UserShort},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    policy: StockPolicy,
}

impl UsersService {
    pub fn new(repository: Repository, policy: StockPolicy) -> Self {
        Self { repository, policy }
    }

    pub async fn list(&self) -> AppResult<Vec<UserShort>> {
        self.repository.users.list().await
    }

    /// Get a user with their borrow history
    pub async fn get(&self, id: i32) -> AppResult<UserDetails> {
        let user = self.repository.users.get_by_id(id).await?;
        let borrow_records = self.repository.borrow_records.list_for_user(id).await?;
        Ok(UserDetails { user, borrow_records })
    }

    pub async fn create(&self, data: CreateUser) -> AppResult<User> {
        data.validate()?;
        let user = self.repository.users.create(&data).await?;
        tracing::info!("User {} created ({:?})", user.id, user.username);
        Ok(user)
    }

    pub async fn update(&self, id: i32, data: UpdateUser) -> AppResult<User> {
        ensure_matching_id(id, data.id)?;
        data.validate()?;
        let user = self.repository.users.update(id, &data).await?;
        tracing::info!("User {} updated", id);
        Ok(user)
    }

    /// Delete a user after their borrow records
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let records = self.repository.users.delete(id, self.policy).await?;
        tracing::info!("User {} deleted with {} borrow record(s)", id, records);
        Ok(())
    }
}
