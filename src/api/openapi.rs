//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrow_records, genres, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Book Lending API",
        version = "1.0.0",
        description = "Library lending administration REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Genres
        genres::list_genres,
        genres::get_genre,
        genres::create_genre,
        genres::update_genre,
        genres::delete_genre,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        // Borrow records
        borrow_records::list_borrow_records,
        borrow_records::get_borrow_record,
        borrow_records::create_borrow_record,
        borrow_records::update_borrow_record,
        borrow_records::delete_borrow_record,
        borrow_records::get_user_borrow_records,
        borrow_records::borrow_for_user,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::book::BookDetails,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Genres
            crate::models::genre::Genre,
            crate::models::genre::GenreShort,
            crate::models::genre::GenreDetails,
            crate::models::genre::CreateGenre,
            crate::models::genre::UpdateGenre,
            // Users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::UserDetails,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Borrow records
            crate::models::borrow_record::BorrowRecord,
            crate::models::borrow_record::BorrowRecordDetails,
            crate::models::borrow_record::CreateBorrowRecord,
            crate::models::borrow_record::CreateUserBorrowRecord,
            crate::models::borrow_record::UpdateBorrowRecord,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "genres", description = "Genre management"),
        (name = "users", description = "User directory"),
        (name = "borrow-records", description = "Lending ledger")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
