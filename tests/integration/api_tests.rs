//! API integration tests
//!
//! Need a running server on a fresh database with the default `legacy`
//! stock policy. Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

async fn post(client: &Client, path: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{}{}", BASE_URL, path))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request")
}

async fn put(client: &Client, path: &str, body: Value) -> reqwest::Response {
    client
        .put(format!("{}{}", BASE_URL, path))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request")
}

async fn get_json(client: &Client, path: &str) -> Value {
    let response = client
        .get(format!("{}{}", BASE_URL, path))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success(), "GET {} -> {}", path, response.status());
    response.json().await.expect("Failed to parse response")
}

async fn delete(client: &Client, path: &str) -> reqwest::Response {
    client
        .delete(format!("{}{}", BASE_URL, path))
        .send()
        .await
        .expect("Failed to send request")
}

async fn created_id(response: reqwest::Response) -> i64 {
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No id in response")
}

/// Create a genre, a book with the given stock in it, and a user
async fn seed(client: &Client, stock: i64) -> (i64, i64, i64) {
    let genre_id = created_id(post(client, "/genres", json!({ "name": "Integration" })).await).await;
    let book_id = created_id(
        post(
            client,
            "/books",
            json!({
                "title": "Test Book",
                "author": "Test Author",
                "genre_id": genre_id,
                "pages": 120,
                "price": 990,
                "description": "Used by the integration tests",
                "stock": stock
            }),
        )
        .await,
    )
    .await;
    let user_id = created_id(
        post(
            client,
            "/users",
            json!({ "username": "reader", "email": "reader@example.org", "phone": "555-0100" }),
        )
        .await,
    )
    .await;
    (genre_id, book_id, user_id)
}

async fn stock_of(client: &Client, book_id: i64) -> i64 {
    let body = get_json(client, &format!("/books/{}", book_id)).await;
    body["book"]["stock"].as_i64().expect("No stock in response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();
    let body = get_json(&client, "/health").await;
    assert_eq!(body["status"], "healthy");

    let body = get_json(&client, "/ready").await;
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_borrow_return_delete_scenario() {
    let client = Client::new();
    let (genre_id, book_id, user_id) = seed(&client, 1).await;

    let response = post(&client, "/borrow-records", json!({ "user_id": user_id, "book_id": book_id })).await;
    let record_id = created_id(response).await;
    assert_eq!(stock_of(&client, book_id).await, 0);

    // Second active loan of the same book is rejected
    let response = post(
        &client,
        &format!("/users/{}/borrow-records", user_id),
        json!({ "book_id": book_id }),
    )
    .await;
    assert_eq!(response.status(), 400);

    let record = get_json(&client, &format!("/borrow-records/{}", record_id)).await;
    assert_eq!(record["is_active"], true);

    let response = put(
        &client,
        &format!("/borrow-records/{}", record_id),
        json!({
            "user_id": user_id,
            "book_id": book_id,
            "borrow_date": record["borrow_date"],
            "return_date": chrono::Utc::now()
        }),
    )
    .await;
    assert!(response.status().is_success());
    assert_eq!(stock_of(&client, book_id).await, 1);

    let response = delete(&client, &format!("/borrow-records/{}", record_id)).await;
    assert_eq!(response.status(), 204);
    assert_eq!(stock_of(&client, book_id).await, 2);

    let response = delete(&client, &format!("/genres/{}", genre_id)).await;
    assert_eq!(response.status(), 204);
    let response = delete(&client, &format!("/users/{}", user_id)).await;
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_empty_shelf_and_unknown_entities() {
    let client = Client::new();
    let (genre_id, book_id, user_id) = seed(&client, 0).await;

    let response = post(&client, "/borrow-records", json!({ "user_id": user_id, "book_id": book_id })).await;
    assert_eq!(response.status(), 400);

    let response = post(&client, "/borrow-records", json!({ "user_id": user_id, "book_id": -1 })).await;
    assert_eq!(response.status(), 404);

    let response = client
        .get(format!("{}/users/-1/borrow-records", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    delete(&client, &format!("/genres/{}", genre_id)).await;
    delete(&client, &format!("/users/{}", user_id)).await;
}

#[tokio::test]
#[ignore]
async fn test_edit_id_mismatch_is_bad_request() {
    let client = Client::new();
    let genre_id = created_id(post(&client, "/genres", json!({ "name": "Poetry" })).await).await;

    let response = put(
        &client,
        &format!("/genres/{}", genre_id),
        json!({ "id": genre_id + 1, "name": "Verse" }),
    )
    .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "BadRequest");

    delete(&client, &format!("/genres/{}", genre_id)).await;
}

#[tokio::test]
#[ignore]
async fn test_genre_delete_cascades() {
    let client = Client::new();
    let (genre_id, book_id, user_id) = seed(&client, 2).await;
    let record_id = created_id(
        post(&client, "/borrow-records", json!({ "user_id": user_id, "book_id": book_id })).await,
    )
    .await;

    let response = delete(&client, &format!("/genres/{}", genre_id)).await;
    assert_eq!(response.status(), 204);

    for path in [
        format!("/books/{}", book_id),
        format!("/borrow-records/{}", record_id),
        format!("/genres/{}", genre_id),
    ] {
        let response = client
            .get(format!("{}{}", BASE_URL, path))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 404, "{} should be gone", path);
    }

    delete(&client, &format!("/users/{}", user_id)).await;
}

#[tokio::test]
#[ignore]
async fn test_invalid_book_rejected() {
    let client = Client::new();
    let genre_id = created_id(post(&client, "/genres", json!({ "name": "Essays" })).await).await;

    let response = post(
        &client,
        "/books",
        json!({ "title": "", "genre_id": genre_id, "description": "x", "price": -5 }),
    )
    .await;
    assert_eq!(response.status(), 400);

    delete(&client, &format!("/genres/{}", genre_id)).await;
}

async fn status_of(client: &Client, path: &str) -> reqwest::StatusCode {
    client
        .get(format!("{}{}", BASE_URL, path))
        .send()
        .await
        .expect("Failed to send request")
        .status()
}

#[tokio::test]
#[ignore]
async fn test_book_delete_removes_borrow_records() {
    let client = Client::new();
    let (genre_id, book_id, user_id) = seed(&client, 2).await;
    let record_id = created_id(
        post(&client, "/borrow-records", json!({ "user_id": user_id, "book_id": book_id })).await,
    )
    .await;

    let response = delete(&client, &format!("/books/{}", book_id)).await;
    assert_eq!(response.status(), 204);

    assert_eq!(status_of(&client, &format!("/books/{}", book_id)).await, 404);
    assert_eq!(status_of(&client, &format!("/borrow-records/{}", record_id)).await, 404);

    let records = get_json(&client, &format!("/users/{}/borrow-records", user_id)).await;
    assert_eq!(records.as_array().map(Vec::len), Some(0));

    delete(&client, &format!("/genres/{}", genre_id)).await;
    delete(&client, &format!("/users/{}", user_id)).await;
}

#[tokio::test]
#[ignore]
async fn test_user_delete_gives_copies_back() {
    let client = Client::new();
    let (genre_id, book_id, user_id) = seed(&client, 2).await;
    let record_id = created_id(
        post(&client, "/borrow-records", json!({ "user_id": user_id, "book_id": book_id })).await,
    )
    .await;
    assert_eq!(stock_of(&client, book_id).await, 1);

    let response = delete(&client, &format!("/users/{}", user_id)).await;
    assert_eq!(response.status(), 204);

    assert_eq!(stock_of(&client, book_id).await, 2);
    assert_eq!(status_of(&client, &format!("/borrow-records/{}", record_id)).await, 404);
    assert_eq!(status_of(&client, &format!("/users/{}", user_id)).await, 404);

    delete(&client, &format!("/genres/{}", genre_id)).await;
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrows_of_last_copy() {
    let client = Client::new();
    let (genre_id, book_id, first_user) = seed(&client, 1).await;
    let second_user = created_id(post(&client, "/users", json!({ "username": "second reader" })).await).await;

    let (a, b) = tokio::join!(
        post(&client, "/borrow-records", json!({ "user_id": first_user, "book_id": book_id })),
        post(&client, "/borrow-records", json!({ "user_id": second_user, "book_id": book_id })),
    );
    let mut statuses = [a.status().as_u16(), b.status().as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, [201, 400]);
    assert_eq!(stock_of(&client, book_id).await, 0);

    delete(&client, &format!("/genres/{}", genre_id)).await;
    delete(&client, &format!("/users/{}", first_user)).await;
    delete(&client, &format!("/users/{}", second_user)).await;
}

#[tokio::test]
#[ignore]
async fn test_book_delete_races_record_edit() {
    let client = Client::new();

    for _ in 0..20 {
        let (genre_id, book_id, user_id) = seed(&client, 3).await;
        let record_id = created_id(
            post(&client, "/borrow-records", json!({ "user_id": user_id, "book_id": book_id })).await,
        )
        .await;
        let record = get_json(&client, &format!("/borrow-records/{}", record_id)).await;

        let record_path = format!("/borrow-records/{}", record_id);
        let book_path = format!("/books/{}", book_id);
        let (edit, removal) = tokio::join!(
            put(
                &client,
                &record_path,
                json!({
                    "user_id": user_id,
                    "book_id": book_id,
                    "borrow_date": record["borrow_date"],
                    "return_date": chrono::Utc::now()
                }),
            ),
            delete(&client, &book_path),
        );
        assert_eq!(removal.status(), 204);
        assert!(
            edit.status() == 200 || edit.status() == 404,
            "edit -> {}",
            edit.status()
        );
        assert_eq!(status_of(&client, &format!("/borrow-records/{}", record_id)).await, 404);

        delete(&client, &format!("/genres/{}", genre_id)).await;
        delete(&client, &format!("/users/{}", user_id)).await;
    }
}

#[tokio::test]
#[ignore]
async fn test_book_listing_carries_genre_name() {
    let client = Client::new();
    let (genre_id, book_id, user_id) = seed(&client, 1).await;

    let books = get_json(&client, "/books").await;
    let listed = books
        .as_array()
        .and_then(|books| books.iter().find(|b| b["id"].as_i64() == Some(book_id)))
        .expect("Book missing from listing");
    assert_eq!(listed["genre_name"], "Integration");
    assert_eq!(listed["nb_active_loans"], 0);

    delete(&client, &format!("/genres/{}", genre_id)).await;
    delete(&client, &format!("/users/{}", user_id)).await;
}
