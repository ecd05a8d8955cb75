//! Stock rules for creating, editing and deleting borrow records

use chrono::{DateTime, Utc};

use super::{BookStock, LedgerEntry, StockPlan, StockPolicy};
use crate::error::{AppError, AppResult};

/// Everything an edit needs to know, read under lock
#[derive(Debug, Clone, Copy)]
pub struct EditContext {
    /// The record as stored
    pub current: LedgerEntry,
    /// The record as submitted
    pub target: LedgerEntry,
    /// Stock of `target.book_id`
    pub target_book: BookStock,
    /// Another active record exists for the target (user, book) pair
    pub has_active_duplicate: bool,
}

/// Reserve one copy of `book` in `plan`, refusing duplicates and empty shelves.
fn take_copy(plan: &mut StockPlan, book: BookStock, has_active_duplicate: bool) -> AppResult<()> {
    if has_active_duplicate {
        return Err(AppError::Validation(format!(
            "User already has an active loan for book {}",
            book.id
        )));
    }
    let on_shelf = book.stock.checked_add(plan.delta_for(book.id)).ok_or_else(|| {
        AppError::Validation(format!("Stock of book {} is out of range", book.id))
    })?;
    if on_shelf <= 0 {
        return Err(AppError::Validation(format!(
            "Book {} has no copies available",
            book.id
        )));
    }
    plan.adjust(book.id, -1);
    Ok(())
}

/// Plan the stock change for a new borrow record.
pub fn plan_create(
    policy: StockPolicy,
    book: BookStock,
    entry: &LedgerEntry,
    has_active_duplicate: bool,
    now: DateTime<Utc>,
) -> AppResult<StockPlan> {
    let mut plan = StockPlan::default();
    match policy {
        StockPolicy::Legacy => take_copy(&mut plan, book, has_active_duplicate)?,
        StockPolicy::Balanced => {
            if entry.is_active(now) {
                take_copy(&mut plan, book, has_active_duplicate)?;
            }
        }
    }
    Ok(plan)
}

/// Plan the stock changes for overwriting a borrow record.
pub fn plan_edit(policy: StockPolicy, ctx: &EditContext, now: DateTime<Utc>) -> AppResult<StockPlan> {
    if ctx.target_book.id != ctx.target.book_id {
        return Err(AppError::Internal(format!(
            "stock snapshot for book {} given for book {}",
            ctx.target_book.id, ctx.target.book_id
        )));
    }

    match policy {
        StockPolicy::Legacy => plan_edit_legacy(ctx, now),
        StockPolicy::Balanced => plan_edit_balanced(ctx, now),
    }
}

fn plan_edit_legacy(ctx: &EditContext, now: DateTime<Utc>) -> AppResult<StockPlan> {
    let EditContext { current, target, .. } = ctx;
    let mut plan = StockPlan::default();

    if target.book_id != current.book_id {
        take_copy(&mut plan, ctx.target_book, ctx.has_active_duplicate)?;
        plan.adjust(current.book_id, 1);
    }

    if target.return_date != current.return_date {
        if current.return_date.is_some() && !current.is_active(now) {
            plan.adjust(target.book_id, 1);
        }
        if target.return_date.is_some() && !target.is_active(now) {
            plan.adjust(target.book_id, 1);
        }
    }

    Ok(plan)
}

fn plan_edit_balanced(ctx: &EditContext, now: DateTime<Utc>) -> AppResult<StockPlan> {
    let EditContext { current, target, .. } = ctx;
    let was_active = current.is_active(now);
    let mut plan = StockPlan::default();

    if was_active {
        plan.adjust(current.book_id, 1);
    }

    if target.is_active(now) {
        let same_loan = was_active
            && current.book_id == target.book_id
            && current.user_id == target.user_id;
        let duplicate = ctx.has_active_duplicate && !same_loan;
        take_copy(&mut plan, ctx.target_book, duplicate)?;
    }

    Ok(plan)
}

/// Plan the stock change for removing a borrow record.
pub fn plan_delete(policy: StockPolicy, entry: &LedgerEntry, now: DateTime<Utc>) -> StockPlan {
    let mut plan = StockPlan::default();
    match policy {
        StockPolicy::Legacy => plan.adjust(entry.book_id, 1),
        StockPolicy::Balanced => {
            if entry.is_active(now) {
                plan.adjust(entry.book_id, 1);
            }
        }
    }
    plan
}
