//! Lending ledger stock bookkeeping
//!
//! Borrow records hold copies of books. Every ledger mutation is planned here
//! as a set of per-book stock deltas before the repository applies it inside
//! a single transaction. Nothing in this module touches the database.

pub mod rules;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;

pub use rules::{plan_create, plan_delete, plan_edit, EditContext};

/// How borrow record mutations move book stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockPolicy {
    /// Create takes a copy, delete always gives one back, and past return
    /// dates give copies back whenever the return date is edited.
    #[default]
    Legacy,
    /// Stock only moves when a record flips between active and returned.
    Balanced,
}

/// Whether a loan with this return date still holds its copy at `now`.
pub fn is_active(return_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match return_date {
        None => true,
        Some(date) => date > now,
    }
}

/// The ledger-relevant part of a borrow record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerEntry {
    pub user_id: i32,
    pub book_id: i32,
    pub return_date: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        is_active(self.return_date, now)
    }
}

/// Stock of a book as read under its row lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct BookStock {
    pub id: i32,
    pub stock: i32,
}

/// Stock delta for one book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub book_id: i32,
    pub delta: i32,
}

/// Net stock deltas produced by one ledger operation, at most one per book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockPlan {
    changes: Vec<StockChange>,
}

impl StockPlan {
    pub fn adjust(&mut self, book_id: i32, delta: i32) {
        if let Some(pos) = self.changes.iter().position(|c| c.book_id == book_id) {
            self.changes[pos].delta += delta;
            if self.changes[pos].delta == 0 {
                self.changes.remove(pos);
            }
        } else if delta != 0 {
            self.changes.push(StockChange { book_id, delta });
        }
    }

    /// Fold another plan into this one.
    pub fn absorb(&mut self, other: StockPlan) {
        for change in other.changes {
            self.adjust(change.book_id, change.delta);
        }
    }

    pub fn delta_for(&self, book_id: i32) -> i32 {
        self.changes
            .iter()
            .find(|c| c.book_id == book_id)
            .map(|c| c.delta)
            .unwrap_or(0)
    }

    pub fn changes(&self) -> &[StockChange] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
