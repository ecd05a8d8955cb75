//! Catalog management service: books and genres

use validator::Validate;

use super::ensure_matching_id;
use crate::{
    error::AppResult,
    models::{
        book::{Book, BookDetails, BookShort, CreateBook, UpdateBook},
        genre::{CreateGenre, Genre, GenreDetails, GenreShort, UpdateGenre},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_books(&self) -> AppResult<Vec<BookShort>> {
        self.repository.books.list().await
    }

    /// Get a book with its genre and borrow history
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        let genre = self.repository.genres.get_by_id(book.genre_id).await?;
        let borrow_records = self.repository.borrow_records.list_for_book(id).await?;
        Ok(BookDetails {
            book,
            genre,
            borrow_records,
        })
    }

    pub async fn create_book(&self, data: CreateBook) -> AppResult<Book> {
        data.validate()?;
        // Verify genre exists
        self.repository.genres.get_by_id(data.genre_id).await?;

        let book = self.repository.books.create(&data).await?;
        tracing::info!("Book {} created ({:?}, stock {})", book.id, book.title, book.stock);
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, data: UpdateBook) -> AppResult<Book> {
        ensure_matching_id(id, data.id)?;
        data.validate()?;
        self.repository.genres.get_by_id(data.genre_id).await?;

        let book = self.repository.books.update(id, &data).await?;
        tracing::info!("Book {} updated", id);
        Ok(book)
    }

    /// Delete a book after its borrow records
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        let records = self.repository.books.delete(id).await?;
        tracing::info!("Book {} deleted with {} borrow record(s)", id, records);
        Ok(())
    }

    pub async fn list_genres(&self) -> AppResult<Vec<GenreShort>> {
        self.repository.genres.list().await
    }

    /// Get a genre with its books
    pub async fn get_genre(&self, id: i32) -> AppResult<GenreDetails> {
        let genre = self.repository.genres.get_by_id(id).await?;
        let books = self.repository.books.list_by_genre(id).await?;
        Ok(GenreDetails { genre, books })
    }

    pub async fn create_genre(&self, data: CreateGenre) -> AppResult<Genre> {
        data.validate()?;
        let genre = self.repository.genres.create(&data).await?;
        tracing::info!("Genre {} created ({:?})", genre.id, genre.name);
        Ok(genre)
    }

    pub async fn update_genre(&self, id: i32, data: UpdateGenre) -> AppResult<Genre> {
        ensure_matching_id(id, data.id)?;
        data.validate()?;
        let genre = self.repository.genres.update(id, &data).await?;
        tracing::info!("Genre {} renamed to {:?}", id, genre.name);
        Ok(genre)
    }

    /// Delete a genre, its books and their borrow records
    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        let removed = self.repository.genres.delete(id).await?;
        tracing::info!(
            "Genre {} deleted with {} book(s) and {} borrow record(s)",
            id, removed.books, removed.borrow_records
        );
        Ok(())
    }
}
