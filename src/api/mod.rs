//! API handlers for the lending REST endpoints

pub mod books;
pub mod borrow_records;
pub mod genres;
pub mod health;
pub mod openapi;
pub mod users;
