use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Book, NewBook};

/// In-memory store implementation.
pub mod memory;
/// PostgreSQL store implementation.
pub mod postgres;

pub use memory::MemoryBookStore;
pub use postgres::PgBookStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("book {0} not found")]
    NotFound(i64),

    #[error("no ids left after {0}")]
    IdsExhausted(i64),

    #[error("store backend failure: {0}")]
    Backend(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations for books.
///
/// Ids are assigned by the store, are positive, and are never reused
/// within one store instance.
#[async_trait]
pub trait BookStore: Debug {
    /// Persist a new book and return it with its assigned id.
    async fn create(&self, book: NewBook) -> StoreResult<Book>;

    /// Every stored book. No ordering is guaranteed.
    async fn list(&self) -> StoreResult<Vec<Book>>;

    /// Fails with [`StoreError::NotFound`] for an unknown id.
    async fn get(&self, id: i64) -> StoreResult<Book>;

    /// Overwrite the row with `book.id` and return what was stored.
    async fn update(&self, book: &Book) -> StoreResult<Book>;

    /// Remove the row permanently.
    async fn delete(&self, id: i64) -> StoreResult<()>;
}

pub type BookStoreArc = Arc<dyn BookStore + Send + Sync>;
