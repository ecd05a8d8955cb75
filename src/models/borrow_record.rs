//! Borrow record (loan) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::ledger::LedgerEntry;

/// Borrow record model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

impl BorrowRecord {
    pub fn entry(&self) -> LedgerEntry {
        LedgerEntry {
            user_id: self.user_id,
            book_id: self.book_id,
            return_date: self.return_date,
        }
    }
}

/// Borrow record with the borrower's name and the book title
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecordDetails {
    pub id: i32,
    pub user_id: i32,
    pub username: String,
    pub book_id: i32,
    pub book_title: String,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    /// Return date unset or still in the future
    pub is_active: bool,
}

/// Create borrow record request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBorrowRecord {
    pub user_id: i32,
    pub book_id: i32,
    /// Defaults to the time of creation
    pub borrow_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
}

impl CreateBorrowRecord {
    pub fn entry(&self) -> LedgerEntry {
        LedgerEntry {
            user_id: self.user_id,
            book_id: self.book_id,
            return_date: self.return_date,
        }
    }
}

/// Borrow request for a user given by the route
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserBorrowRecord {
    pub book_id: i32,
    pub borrow_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
}

impl CreateUserBorrowRecord {
    pub fn for_user(self, user_id: i32) -> CreateBorrowRecord {
        CreateBorrowRecord {
            user_id,
            book_id: self.book_id,
            borrow_date: self.borrow_date,
            return_date: self.return_date,
        }
    }
}

/// Update borrow record request; every mutable field is overwritten
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateBorrowRecord {
    /// Must match the route id when present
    pub id: Option<i32>,
    pub user_id: i32,
    pub book_id: i32,
    pub borrow_date: DateTime<Utc>,
    /// Setting a date at or before now marks the book returned
    pub return_date: Option<DateTime<Utc>>,
}

impl UpdateBorrowRecord {
    pub fn entry(&self) -> LedgerEntry {
        LedgerEntry {
            user_id: self.user_id,
            book_id: self.book_id,
            return_date: self.return_date,
        }
    }
}
