//! Borrow records repository: the lending ledger's transactional writes

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Pool, Postgres};

use super::{
    books::{apply_stock_plan, lock_stock},
    users::user_exists,
};
use crate::{
    error::{AppError, AppResult},
    ledger::{plan_create, plan_delete, plan_edit, EditContext, StockPolicy},
    models::borrow_record::{BorrowRecord, BorrowRecordDetails, CreateBorrowRecord, UpdateBorrowRecord},
};

const DETAILS_SELECT: &str = r#"
    SELECT br.id, br.user_id, u.username, br.book_id, b.title AS book_title,
           br.borrow_date, br.return_date,
           (br.return_date IS NULL OR br.return_date > NOW()) AS is_active
    FROM borrow_records br
    JOIN users u ON u.id = br.user_id
    JOIN books b ON b.id = br.book_id
"#;

#[derive(Clone)]
pub struct BorrowRecordsRepository {
    pool: Pool<Postgres>,
}

impl BorrowRecordsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List every borrow record, newest first
    pub async fn list(&self) -> AppResult<Vec<BorrowRecordDetails>> {
        let records = sqlx::query_as::<_, BorrowRecordDetails>(&format!(
            "{} ORDER BY br.borrow_date DESC, br.id DESC",
            DETAILS_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Borrow history of a user
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowRecordDetails>> {
        let records = sqlx::query_as::<_, BorrowRecordDetails>(&format!(
            "{} WHERE br.user_id = $1 ORDER BY br.borrow_date DESC, br.id DESC",
            DETAILS_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Borrow history of a book
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BorrowRecordDetails>> {
        let records = sqlx::query_as::<_, BorrowRecordDetails>(&format!(
            "{} WHERE br.book_id = $1 ORDER BY br.borrow_date DESC, br.id DESC",
            DETAILS_SELECT
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// Get a borrow record with its user and book
    pub async fn get_details(&self, id: i32) -> AppResult<BorrowRecordDetails> {
        sqlx::query_as::<_, BorrowRecordDetails>(&format!("{} WHERE br.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow record with id {} not found", id)))
    }

    /// Insert a borrow record and take a copy of its book
    pub async fn create(&self, data: &CreateBorrowRecord, policy: StockPolicy) -> AppResult<BorrowRecord> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        if !user_exists(&mut *tx, data.user_id).await? {
            return Err(AppError::NotFound(format!("User with id {} not found", data.user_id)));
        }

        let book = lock_stock(&mut *tx, &[data.book_id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", data.book_id)))?;

        let duplicate = has_active_record(&mut *tx, data.user_id, data.book_id, None, now).await?;
        let plan = plan_create(policy, book, &data.entry(), duplicate, now)?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrow_records (user_id, book_id, borrow_date, return_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(data.book_id)
        .bind(data.borrow_date.unwrap_or(now))
        .bind(data.return_date)
        .fetch_one(&mut *tx)
        .await?;

        apply_stock_plan(&mut *tx, &plan).await?;
        tx.commit().await?;

        Ok(record)
    }

    /// Overwrite a borrow record and move stock accordingly
    pub async fn update(&self, id: i32, data: &UpdateBorrowRecord, policy: StockPolicy) -> AppResult<BorrowRecord> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let current = lock_record(&mut *tx, id).await?;

        if data.user_id != current.user_id && !user_exists(&mut *tx, data.user_id).await? {
            return Err(AppError::NotFound(format!("User with id {} not found", data.user_id)));
        }

        let target_book = lock_stock(&mut *tx, &[current.book_id, data.book_id])
            .await?
            .into_iter()
            .find(|b| b.id == data.book_id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", data.book_id)))?;

        let duplicate = has_active_record(&mut *tx, data.user_id, data.book_id, Some(id), now).await?;
        let ctx = EditContext {
            current: current.entry(),
            target: data.entry(),
            target_book,
            has_active_duplicate: duplicate,
        };
        let plan = plan_edit(policy, &ctx, now)?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrow_records
            SET user_id = $1, book_id = $2, borrow_date = $3, return_date = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(data.book_id)
        .bind(data.borrow_date)
        .bind(data.return_date)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        apply_stock_plan(&mut *tx, &plan).await?;
        tx.commit().await?;

        Ok(record)
    }

    /// Remove a borrow record and give its copy back. Returns the removed record.
    pub async fn delete(&self, id: i32, policy: StockPolicy) -> AppResult<BorrowRecord> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let current = lock_record(&mut *tx, id).await?;
        lock_stock(&mut *tx, &[current.book_id]).await?;
        let plan = plan_delete(policy, &current.entry(), now);

        sqlx::query("DELETE FROM borrow_records WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        apply_stock_plan(&mut *tx, &plan).await?;
        tx.commit().await?;

        Ok(current)
    }
}

async fn lock_record(conn: &mut PgConnection, id: i32) -> AppResult<BorrowRecord> {
    sqlx::query_as::<_, BorrowRecord>("SELECT * FROM borrow_records WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrow record with id {} not found", id)))
}

/// Whether (user, book) has an active record other than `exclude_id`
async fn has_active_record(
    conn: &mut PgConnection,
    user_id: i32,
    book_id: i32,
    exclude_id: Option<i32>,
    now: DateTime<Utc>,
) -> AppResult<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM borrow_records
            WHERE user_id = $1 AND book_id = $2
              AND (return_date IS NULL OR return_date > $3)
              AND ($4::INTEGER IS NULL OR id <> $4)
        )
        "#,
    )
    .bind(user_id)
    .bind(book_id)
    .bind(now)
    .bind(exclude_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(exists)
}
