//! `/books` handlers. Every route sits behind the token middleware.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use shelf_authz::TokenService;
use shelf_http::{decode_json, require_token, respond, ApiResponse, AppError};

use super::models::{Book, BookChanges, NewBook};
use super::store::{BookStoreArc, StoreError};

const NOT_FOUND: &str = "Book not found";

pub fn router(store: BookStoreArc, tokens: Arc<TokenService>) -> Router {
    Router::new()
        .route("/books", post(create_book).get(list_books))
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route_layer(middleware::from_fn_with_state(tokens, require_token))
        .with_state(store)
}

/// Path ids that are not positive integers can never match a row.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::not_found(NOT_FOUND)),
    }
}

/// Any failed lookup reads as a missing book. Backend causes are logged.
fn lookup_error(err: StoreError) -> AppError {
    if let StoreError::Backend(source) = &err {
        tracing::error!(error = %source, "book lookup failed");
    }
    AppError::not_found(NOT_FOUND)
}

/// `NotFound` becomes 404; anything else is a 500 with `message`.
fn store_error(err: StoreError, message: &'static str) -> AppError {
    match err {
        StoreError::NotFound(_) => AppError::not_found(NOT_FOUND),
        err => AppError::internal(message, err),
    }
}

async fn create_book(
    State(store): State<BookStoreArc>,
    body: Bytes,
) -> Result<ApiResponse<Book>, AppError> {
    let new_book: NewBook = decode_json(&body)?;

    let book = store
        .create(new_book)
        .await
        .map_err(|err| AppError::internal("Failed to create book", err))?;

    tracing::info!(book_id = book.id, "book created");
    Ok(respond(
        StatusCode::CREATED,
        "Book created successfully",
        Some(book),
    ))
}

async fn list_books(State(store): State<BookStoreArc>) -> Result<ApiResponse<Vec<Book>>, AppError> {
    let books = store
        .list()
        .await
        .map_err(|err| AppError::internal("Failed to retrieve books", err))?;

    Ok(respond(
        StatusCode::OK,
        "Books retrieved successfully",
        Some(books),
    ))
}

async fn get_book(
    State(store): State<BookStoreArc>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Book>, AppError> {
    let id = parse_id(&id)?;

    let book = store.get(id).await.map_err(lookup_error)?;

    Ok(respond(
        StatusCode::OK,
        "Book retrieved successfully",
        Some(book),
    ))
}

/// Looks the book up before reading the body, so an unknown id is a 404
/// even when the body is malformed.
async fn update_book(
    State(store): State<BookStoreArc>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<ApiResponse<Book>, AppError> {
    let id = parse_id(&id)?;

    let mut book = store
        .get(id)
        .await
        .map_err(|err| store_error(err, "Failed to update book"))?;

    let changes: BookChanges = decode_json(&body)?;
    changes.apply(&mut book);

    let book = store
        .update(&book)
        .await
        .map_err(|err| store_error(err, "Failed to update book"))?;

    tracing::info!(book_id = book.id, "book updated");
    Ok(respond(
        StatusCode::OK,
        "Book updated successfully",
        Some(book),
    ))
}

async fn delete_book(
    State(store): State<BookStoreArc>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let id = parse_id(&id)?;

    store
        .delete(id)
        .await
        .map_err(|err| store_error(err, "Failed to delete book"))?;

    tracing::info!(book_id = id, "book deleted");
    Ok(respond(StatusCode::OK, "Book deleted successfully", None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_positive_integer_ids_parse() {
        assert_eq!(parse_id("1").unwrap(), 1);
        assert_eq!(parse_id("9007199254740993").unwrap(), 9_007_199_254_740_993);
        for raw in ["0", "-3", "abc", "1.5", "", "99999999999999999999"] {
            assert!(matches!(parse_id(raw), Err(AppError::NotFound(_))), "{raw}");
        }
    }

    #[test]
    fn backend_failures_keep_their_message() {
        let err = store_error(StoreError::Backend(sqlx::Error::PoolTimedOut), "Failed to delete book");
        assert!(matches!(err, AppError::Internal { ref message, .. } if message == "Failed to delete book"));

        let err = store_error(StoreError::NotFound(4), "Failed to delete book");
        assert!(matches!(err, AppError::NotFound(ref message) if message == NOT_FOUND));
    }

    #[test]
    fn lookup_failures_are_not_found() {
        let err = lookup_error(StoreError::Backend(sqlx::Error::PoolTimedOut));
        assert!(matches!(err, AppError::NotFound(ref message) if message == NOT_FOUND));
        assert!(matches!(lookup_error(StoreError::NotFound(9)), AppError::NotFound(_)));
    }
}
