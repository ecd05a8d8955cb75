//! Borrow record (lending ledger) endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::borrow_record::{
        BorrowRecord, BorrowRecordDetails, CreateBorrowRecord, CreateUserBorrowRecord, UpdateBorrowRecord,
    },
};

/// List all borrow records
#[utoipa::path(
    get,
    path = "/borrow-records",
    tag = "borrow-records",
    responses(
        (status = 200, description = "Borrow records, newest first", body = Vec<BorrowRecordDetails>)
    )
)]
pub async fn list_borrow_records(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BorrowRecordDetails>>> {
    let records = state.services.ledger.list().await?;
    Ok(Json(records))
}

/// Get a borrow record
#[utoipa::path(
    get,
    path = "/borrow-records/{id}",
    tag = "borrow-records",
    params(
        ("id" = i32, Path, description = "Borrow record ID")
    ),
    responses(
        (status = 200, description = "Borrow record details", body = BorrowRecordDetails),
        (status = 404, description = "Borrow record not found")
    )
)]
pub async fn get_borrow_record(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowRecordDetails>> {
    let record = state.services.ledger.get(id).await?;
    Ok(Json(record))
}

/// Lend a book
#[utoipa::path(
    post,
    path = "/borrow-records",
    tag = "borrow-records",
    request_body = CreateBorrowRecord,
    responses(
        (status = 201, description = "Borrow record created", body = BorrowRecord),
        (status = 400, description = "Active loan already exists or no copies available"),
        (status = 404, description = "User or book not found")
    )
)]
pub async fn create_borrow_record(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateBorrowRecord>,
) -> AppResult<(StatusCode, Json<BorrowRecord>)> {
    let record = state.services.ledger.create(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Overwrite a borrow record (change book, borrower or return date)
#[utoipa::path(
    put,
    path = "/borrow-records/{id}",
    tag = "borrow-records",
    params(
        ("id" = i32, Path, description = "Borrow record ID")
    ),
    request_body = UpdateBorrowRecord,
    responses(
        (status = 200, description = "Borrow record updated", body = BorrowRecord),
        (status = 400, description = "Id mismatch, active loan already exists or no copies available"),
        (status = 404, description = "Borrow record, user or book not found")
    )
)]
pub async fn update_borrow_record(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateBorrowRecord>,
) -> AppResult<Json<BorrowRecord>> {
    let record = state.services.ledger.update(id, request).await?;
    Ok(Json(record))
}

/// Delete a borrow record
#[utoipa::path(
    delete,
    path = "/borrow-records/{id}",
    tag = "borrow-records",
    params(
        ("id" = i32, Path, description = "Borrow record ID")
    ),
    responses(
        (status = 204, description = "Borrow record deleted"),
        (status = 404, description = "Borrow record not found")
    )
)]
pub async fn delete_borrow_record(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.ledger.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get the borrow records of a user
#[utoipa::path(
    get,
    path = "/users/{id}/borrow-records",
    tag = "borrow-records",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's borrow records", body = Vec<BorrowRecordDetails>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_borrow_records(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<BorrowRecordDetails>>> {
    let records = state.services.ledger.list_for_user(user_id).await?;
    Ok(Json(records))
}

/// Lend a book to the given user
#[utoipa::path(
    post,
    path = "/users/{id}/borrow-records",
    tag = "borrow-records",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = CreateUserBorrowRecord,
    responses(
        (status = 201, description = "Borrow record created", body = BorrowRecord),
        (status = 400, description = "Active loan already exists or no copies available"),
        (status = 404, description = "User or book not found")
    )
)]
pub async fn borrow_for_user(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i32>,
    Json(request): Json<CreateUserBorrowRecord>,
) -> AppResult<(StatusCode, Json<BorrowRecord>)> {
    let record = state.services.ledger.create_for_user(user_id, request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}
