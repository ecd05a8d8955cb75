//! User (borrower) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::borrow_record::BorrowRecordDetails;

/// User model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// User row for listings, with loan counters
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserShort {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub nb_borrow_records: i64,
    pub nb_active_loans: i64,
}

/// User with their borrow history
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserDetails {
    pub user: User,
    pub borrow_records: Vec<BorrowRecordDetails>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Update user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    /// Must match the route id when present
    pub id: Option<i32>,
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_optional_but_checked() {
        let user = CreateUser {
            username: "ada".to_string(),
            email: None,
            phone: Some("555-0100".to_string()),
        };
        assert!(user.validate().is_ok());

        let user = CreateUser {
            username: "ada".to_string(),
            email: Some("not-an-email".to_string()),
            phone: None,
        };
        assert!(user.validate().unwrap_err().field_errors().contains_key("email"));
    }

    #[test]
    fn test_username_required() {
        let user = UpdateUser {
            id: Some(3),
            username: String::new(),
            email: Some("ada@example.org".to_string()),
            phone: None,
        };
        assert!(user.validate().unwrap_err().field_errors().contains_key("username"));
    }
}
