//! Books repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    ledger::{BookStock, StockPlan},
    models::book::{Book, BookShort, CreateBook, UpdateBook},
};

const BOOK_SHORT_SELECT: &str = r#"
    SELECT b.id, b.title, b.author, b.genre_id, g.name AS genre_name, b.stock,
           (
               SELECT COUNT(*) FROM borrow_records br
               WHERE br.book_id = b.id
                 AND (br.return_date IS NULL OR br.return_date > NOW())
           ) AS nb_active_loans
    FROM books b
    JOIN genres g ON g.id = b.genre_id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all books with their genre name
    pub async fn list(&self) -> AppResult<Vec<BookShort>> {
        let books = sqlx::query_as::<_, BookShort>(&format!("{} ORDER BY b.title, b.id", BOOK_SHORT_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// List books filed under a genre
    pub async fn list_by_genre(&self, genre_id: i32) -> AppResult<Vec<BookShort>> {
        let books = sqlx::query_as::<_, BookShort>(&format!(
            "{} WHERE b.genre_id = $1 ORDER BY b.title, b.id",
            BOOK_SHORT_SELECT
        ))
        .bind(genre_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let row = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, genre_id, pages, price, description, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.genre_id)
        .bind(book.pages)
        .bind(book.price)
        .bind(&book.description)
        .bind(book.stock)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Overwrite every mutable field of a book
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, author = $2, genre_id = $3, pages = $4,
                price = $5, description = $6, stock = $7
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.genre_id)
        .bind(book.pages)
        .bind(book.price)
        .bind(&book.description)
        .bind(book.stock)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Delete a book and its borrow records. Returns the number of records removed.
    pub async fn delete(&self, id: i32) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        // Records before the book, in the same order as ledger writes
        sqlx::query("SELECT id FROM borrow_records WHERE book_id = $1 ORDER BY id FOR UPDATE")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query_scalar::<_, i32>("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let records = sqlx::query("DELETE FROM borrow_records WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(records)
    }
}

/// Lock the given books' rows in id order and read their stock.
/// Unknown ids are simply absent from the result.
pub(crate) async fn lock_stock(conn: &mut PgConnection, ids: &[i32]) -> AppResult<Vec<BookStock>> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let rows = sqlx::query_as::<_, BookStock>(
        "SELECT id, stock FROM books WHERE id = ANY($1) ORDER BY id FOR UPDATE",
    )
    .bind(&ids[..])
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

/// Apply planned stock deltas. Callers must hold the rows from `lock_stock`.
pub(crate) async fn apply_stock_plan(conn: &mut PgConnection, plan: &StockPlan) -> AppResult<()> {
    for change in plan.changes() {
        tracing::debug!("Stock of book {} changes by {}", change.book_id, change.delta);
        sqlx::query("UPDATE books SET stock = stock + $1 WHERE id = $2")
            .bind(change.delta)
            .bind(change.book_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
