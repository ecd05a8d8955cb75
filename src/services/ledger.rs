//! Lending ledger service: borrow records and their stock bookkeeping

use super::ensure_matching_id;
use crate::{
    error::AppResult,
    ledger::StockPolicy,
    models::borrow_record::{
        BorrowRecord, BorrowRecordDetails, CreateBorrowRecord, CreateUserBorrowRecord, UpdateBorrowRecord,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LedgerService {
    repository: Repository,
    policy: StockPolicy,
}

impl LedgerService {
    pub fn new(repository: Repository, policy: StockPolicy) -> Self {
        Self { repository, policy }
    }

    pub async fn list(&self) -> AppResult<Vec<BorrowRecordDetails>> {
        self.repository.borrow_records.list().await
    }

    pub async fn get(&self, id: i32) -> AppResult<BorrowRecordDetails> {
        self.repository.borrow_records.get_details(id).await
    }

    /// Get the borrow history of a user
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowRecordDetails>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;
        self.repository.borrow_records.list_for_user(user_id).await
    }

    /// Lend a book to a user
    pub async fn create(&self, data: CreateBorrowRecord) -> AppResult<BorrowRecord> {
        let record = self.repository.borrow_records.create(&data, self.policy).await?;
        tracing::info!(
            "Borrow record {} created: user {} borrowed book {}",
            record.id, record.user_id, record.book_id
        );
        Ok(record)
    }

    /// Lend a book to the user given by the route
    pub async fn create_for_user(&self, user_id: i32, data: CreateUserBorrowRecord) -> AppResult<BorrowRecord> {
        self.create(data.for_user(user_id)).await
    }

    pub async fn update(&self, id: i32, data: UpdateBorrowRecord) -> AppResult<BorrowRecord> {
        ensure_matching_id(id, data.id)?;
        let record = self.repository.borrow_records.update(id, &data, self.policy).await?;
        tracing::info!(
            "Borrow record {} updated: user {}, book {}, returned {:?}",
            id, record.user_id, record.book_id, record.return_date
        );
        Ok(record)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let record = self.repository.borrow_records.delete(id, self.policy).await?;
        tracing::info!("Borrow record {} deleted (book {})", id, record.book_id);
        Ok(())
    }
}
