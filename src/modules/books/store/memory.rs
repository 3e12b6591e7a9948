use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BookStore, StoreError, StoreResult};
use crate::modules::books::models::{Book, NewBook};

#[derive(Debug, Default)]
struct Shelf {
    next_id: i64,
    books: HashMap<i64, Book>,
}

/// In-memory implementation of the book store. Used by tests and by
/// `serve --in-memory`; contents are lost on shutdown.
#[derive(Debug, Clone, Default)]
pub struct MemoryBookStore {
    shelf: Arc<RwLock<Shelf>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `books`. New ids continue after
    /// the highest seeded id.
    pub fn with_data(books: Vec<Book>) -> Self {
        let next_id = books.iter().map(|book| book.id).max().unwrap_or(0);
        Self {
            shelf: Arc::new(RwLock::new(Shelf {
                next_id,
                books: books.into_iter().map(|book| (book.id, book)).collect(),
            })),
        }
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn create(&self, book: NewBook) -> StoreResult<Book> {
        let mut shelf = self.shelf.write().await;
        let id = shelf
            .next_id
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted(shelf.next_id))?;
        shelf.next_id = id;
        let book = Book {
            id,
            title: book.title,
            author: book.author,
            year: book.year,
        };
        shelf.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn list(&self) -> StoreResult<Vec<Book>> {
        let shelf = self.shelf.read().await;
        let mut books: Vec<Book> = shelf.books.values().cloned().collect();
        books.sort_by_key(|book| book.id);
        Ok(books)
    }

    async fn get(&self, id: i64) -> StoreResult<Book> {
        self.shelf
            .read()
            .await
            .books
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, book: &Book) -> StoreResult<Book> {
        let mut shelf = self.shelf.write().await;
        let stored = shelf
            .books
            .get_mut(&book.id)
            .ok_or(StoreError::NotFound(book.id))?;
        *stored = book.clone();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        self.shelf
            .write()
            .await
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
