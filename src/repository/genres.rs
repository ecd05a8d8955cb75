//! Genres repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::genre::{CreateGenre, Genre, GenreShort, UpdateGenre},
};

/// Rows removed by a genre deletion
#[derive(Debug, Clone, Copy, Default)]
pub struct GenreCascade {
    pub books: u64,
    pub borrow_records: u64,
}

#[derive(Clone)]
pub struct GenresRepository {
    pool: Pool<Postgres>,
}

impl GenresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List genres with their book counts
    pub async fn list(&self) -> AppResult<Vec<GenreShort>> {
        let genres = sqlx::query_as::<_, GenreShort>(
            r#"
            SELECT g.id, g.name, COUNT(b.id) AS nb_books
            FROM genres g
            LEFT JOIN books b ON b.genre_id = g.id
            GROUP BY g.id, g.name
            ORDER BY g.name, g.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    /// Get genre by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("SELECT * FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre with id {} not found", id)))
    }

    pub async fn create(&self, genre: &CreateGenre) -> AppResult<Genre> {
        let row = sqlx::query_as::<_, Genre>("INSERT INTO genres (name) VALUES ($1) RETURNING *")
            .bind(&genre.name)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn update(&self, id: i32, genre: &UpdateGenre) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("UPDATE genres SET name = $1 WHERE id = $2 RETURNING *")
            .bind(&genre.name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre with id {} not found", id)))
    }

    /// Delete a genre with its books and their borrow records, children first
    pub async fn delete(&self, id: i32) -> AppResult<GenreCascade> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i32>("SELECT id FROM genres WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre with id {} not found", id)))?;

        let borrow_records = sqlx::query(
            "DELETE FROM borrow_records WHERE book_id IN (SELECT id FROM books WHERE genre_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let books = sqlx::query("DELETE FROM books WHERE genre_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(GenreCascade { books, borrow_records })
    }
}
