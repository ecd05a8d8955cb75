//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::borrow_record::BorrowRecordDetails;
use super::genre::Genre;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
    pub genre_id: i32,
    pub pages: i32,
    /// Price in the smallest currency unit
    pub price: i32,
    pub description: String,
    /// Copies currently on the shelf
    pub stock: i32,
}

/// Book row for listings, with its genre name and loan count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
    pub genre_id: i32,
    pub genre_name: String,
    pub stock: i32,
    pub nb_active_loans: i64,
}

/// Book with its genre and borrow history
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    pub book: Book,
    pub genre: Genre,
    pub borrow_records: Vec<BorrowRecordDetails>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub author: Option<String>,
    pub genre_id: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "Pages must not be negative"))]
    pub pages: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price: i32,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 1000000, message = "Stock must be between 0 and 1000000"))]
    pub stock: i32,
}

/// Update book request; every mutable field is overwritten
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    /// Must match the route id when present
    pub id: Option<i32>,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub author: Option<String>,
    pub genre_id: i32,
    #[validate(range(min = 0, message = "Pages must not be negative"))]
    pub pages: i32,
    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price: i32,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(range(min = 0, max = 1000000, message = "Stock must be between 0 and 1000000"))]
    pub stock: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create() -> CreateBook {
        CreateBook {
            title: "Dune".to_string(),
            author: Some("Frank Herbert".to_string()),
            genre_id: 1,
            pages: 412,
            price: 1299,
            description: "Desert planet".to_string(),
            stock: 2,
        }
    }

    #[test]
    fn test_valid_book() {
        assert!(create().validate().is_ok());
    }

    #[test]
    fn test_required_fields() {
        let mut book = create();
        book.title.clear();
        book.description.clear();
        let errors = book.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("description"));
    }

    #[test]
    fn test_negative_numbers_rejected() {
        let mut book = create();
        book.price = -1;
        book.stock = -3;
        let errors = book.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("stock"));
        assert!(!fields.contains_key("pages"));
    }

    #[test]
    fn test_stock_upper_bound() {
        let mut book = create();
        book.stock = i32::MAX;
        let errors = book.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("stock"));

        book.stock = 1_000_000;
        assert!(book.validate().is_ok());
    }

    #[test]
    fn test_create_defaults() {
        let book: CreateBook = serde_json::from_value(serde_json::json!({
            "title": "Emma",
            "genre_id": 2,
            "description": "Matchmaking"
        }))
        .unwrap();
        assert_eq!(book.stock, 0);
        assert_eq!(book.price, 0);
        assert!(book.author.is_none());
    }
}
