//! Users repository for database operations

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use super::books::{apply_stock_plan, lock_stock};
use crate::{
    error::{AppError, AppResult},
    ledger::{plan_delete, StockPlan, StockPolicy},
    models::{
        borrow_record::BorrowRecord,
        user::{CreateUser, UpdateUser, User, UserShort},
    },
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List users with their loan counters
    pub async fn list(&self) -> AppResult<Vec<UserShort>> {
        let users = sqlx::query_as::<_, UserShort>(
            r#"
            SELECT u.id, u.username, u.email, u.phone,
                   COUNT(br.id) AS nb_borrow_records,
                   COUNT(br.id) FILTER (
                       WHERE br.return_date IS NULL OR br.return_date > NOW()
                   ) AS nb_active_loans
            FROM users u
            LEFT JOIN borrow_records br ON br.user_id = u.id
            GROUP BY u.id, u.username, u.email, u.phone
            ORDER BY u.username, u.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    pub async fn create(&self, user: &CreateUser) -> AppResult<User> {
        let row = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, phone) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, id: i32, user: &UpdateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET username = $1, email = $2, phone = $3 WHERE id = $4 RETURNING *",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Delete a user after removing their borrow records. Each removed record
    /// goes through the ledger delete rule, so stock may be given back.
    /// Returns the number of records removed.
    pub async fn delete(&self, id: i32, policy: StockPolicy) -> AppResult<u64> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;

        let records = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_records WHERE user_id = $1 ORDER BY id FOR UPDATE",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let mut plan = StockPlan::default();
        for record in &records {
            plan.absorb(plan_delete(policy, &record.entry(), now));
        }

        let book_ids: Vec<i32> = records.iter().map(|r| r.book_id).collect();
        lock_stock(&mut *tx, &book_ids).await?;

        sqlx::query("DELETE FROM borrow_records WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        apply_stock_plan(&mut *tx, &plan).await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(records.len() as u64)
    }
}

/// Whether a user exists. Holds a key-share lock so a concurrent delete of
/// the user waits for the caller's transaction.
pub(crate) async fn user_exists(conn: &mut PgConnection, id: i32) -> AppResult<bool> {
    let found = sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE id = $1 FOR KEY SHARE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}
