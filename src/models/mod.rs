//! Data models for the lending catalog

pub mod book;
pub mod borrow_record;
pub mod genre;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookDetails, BookShort};
pub use borrow_record::{BorrowRecord, BorrowRecordDetails};
pub use genre::{Genre, GenreDetails, GenreShort};
pub use user::{User, UserDetails, UserShort};
