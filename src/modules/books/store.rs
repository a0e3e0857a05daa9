use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use super::clock::{Clock, SystemClock};
use super::id::generate_id;
use super::models::{Book, BookPayload, BookSummary};

/// Reasons a store operation can fail. No failure leaves a partial write behind.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookError {
    #[error("missing name")]
    MissingName,

    #[error("readPage ({read_page}) exceeds pageCount ({page_count})")]
    ReadPageExceedsPageCount { read_page: u32, page_count: u32 },

    #[error("book not found")]
    NotFound,
}

/// In-memory, insertion-ordered collection of books.
///
/// One lock guards the whole collection, so every write is a single
/// read-modify-write step.
pub struct BookStore {
    books: RwLock<Vec<Book>>,
    clock: Arc<dyn Clock>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            books: RwLock::new(Vec::new()),
            clock,
        }
    }

    // Validation runs before the guard is taken, so a poisoned lock never
    // holds a half-applied write.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Book>> {
        self.books.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Book>> {
        self.books.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate and append a new book, returning its id.
    pub fn create(&self, payload: BookPayload) -> Result<String, BookError> {
        let fields = payload.validate()?;
        let book = Book::new(generate_id(), fields, self.clock.now());
        let id = book.id.clone();

        self.write().push(book);
        tracing::info!(book_id = %id, "book created");

        Ok(id)
    }

    /// `{id, name, publisher}` for every book, in insertion order.
    pub fn list_summary(&self) -> Vec<BookSummary> {
        self.read().iter().map(Book::to_summary).collect()
    }

    pub fn get_by_id(&self, id: &str) -> Result<Book, BookError> {
        self.read()
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or(BookError::NotFound)
    }

    /// Replace every field except `id` and `insertedAt`, keeping the book's position.
    pub fn update_by_id(&self, id: &str, payload: BookPayload) -> Result<(), BookError> {
        let fields = payload.validate()?;

        let mut books = self.write();
        let book = books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or(BookError::NotFound)?;
        book.apply(fields, self.clock.now());
        tracing::info!(book_id = %id, finished = book.finished, "book updated");

        Ok(())
    }

    pub fn delete_by_id(&self, id: &str) -> Result<(), BookError> {
        let mut books = self.write();
        let index = books
            .iter()
            .position(|book| book.id == id)
            .ok_or(BookError::NotFound)?;
        books.remove(index);
        tracing::info!(book_id = %id, remaining = books.len(), "book deleted");

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl Default for BookStore {
    fn default() -> Self {
        Self::new()
    }
}
