//! Book tracking service: the layer between the HTTP handlers and the
//! storage port.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::Span;

use tracker_kernel::{Book, BookRepository, BooksByGenre, SortKey, StorageError};

/// Outcome of a failed service call.
///
/// `NotFound` is an expected, user-facing condition; `Storage` carries any
/// other backend failure untouched.
#[derive(Debug, Error)]
pub enum BookTrackerError {
    #[error("book with id {id} not found")]
    NotFound { id: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl BookTrackerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Operations offered to the HTTP adapter. Inputs are assumed validated.
#[async_trait]
pub trait BookTracker: Send + Sync + 'static {
    async fn add_book(&self, book: Book) -> Result<(), BookTrackerError>;

    async fn update_book(&self, book: Book) -> Result<(), BookTrackerError>;

    /// All books, ordered by `sort_key` when it names a [`SortKey`] and in
    /// storage order otherwise.
    async fn list_books(&self, sort_key: &str) -> Result<Vec<Book>, BookTrackerError>;

    async fn get_book(&self, id: &str) -> Result<Book, BookTrackerError>;

    async fn group_books_by_genre(&self) -> Result<Vec<BooksByGenre>, BookTrackerError>;
}

/// [`BookTracker`] backed by any [`BookRepository`].
pub struct BookTrackerService {
    storage: Arc<dyn BookRepository>,
    span: Span,
}

impl BookTrackerService {
    /// Events emitted by the service are parented to `span`.
    pub fn new(storage: Arc<dyn BookRepository>, span: Span) -> Self {
        Self { storage, span }
    }
}

#[async_trait]
impl BookTracker for BookTrackerService {
    async fn add_book(&self, mut book: Book) -> Result<(), BookTrackerError> {
        book.set_tracking_details(unix_now());
        self.storage.upsert(&book.isbn, &book).await?;

        tracing::info!(
            parent: &self.span,
            isbn = %book.isbn,
            "book {} inserted successfully",
            book.title
        );
        Ok(())
    }

    async fn update_book(&self, mut book: Book) -> Result<(), BookTrackerError> {
        // Not atomic with the upsert below; a concurrent writer may interleave.
        let existing = self.get_book(&book.isbn).await?;

        book.refresh_tracking_details(&existing, unix_now());
        self.storage.upsert(&book.isbn, &book).await?;

        tracing::info!(parent: &self.span, isbn = %book.isbn, "book updated successfully");
        Ok(())
    }

    async fn list_books(&self, sort_key: &str) -> Result<Vec<Book>, BookTrackerError> {
        let mut books = self.storage.get_all().await?;
        sort_books(sort_key, &mut books);

        tracing::debug!(parent: &self.span, count = books.len(), sort_key, "books listed");
        Ok(books)
    }

    async fn get_book(&self, id: &str) -> Result<Book, BookTrackerError> {
        self.storage.get(id).await.map_err(|e| {
            if e.is_not_found() {
                BookTrackerError::NotFound { id: id.to_owned() }
            } else {
                BookTrackerError::Storage(e)
            }
        })
    }

    async fn group_books_by_genre(&self) -> Result<Vec<BooksByGenre>, BookTrackerError> {
        let books = self.list_books(SortKey::Genre.as_str()).await?;
        let genres = group_by_genre(books);

        tracing::debug!(parent: &self.span, genres = genres.len(), "books grouped by genre");
        Ok(genres)
    }
}

fn unix_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Sorts in place; an empty or unknown key leaves the order untouched.
fn sort_books(sort_key: &str, books: &mut [Book]) {
    if let Ok(key) = sort_key.parse::<SortKey>() {
        books.sort_by(|a, b| key.compare(a, b));
    }
}

/// Splits genre-sorted books into runs of equal genre.
fn group_by_genre(books: Vec<Book>) -> Vec<BooksByGenre> {
    let mut groups: Vec<BooksByGenre> = Vec::new();

    for book in books {
        match groups.last_mut() {
            Some(group) if group.genre == book.genre => {
                group.books.push(book);
                group.count += 1;
            }
            _ => groups.push(BooksByGenre::new(book.genre.clone(), vec![book])),
        }
    }

    groups
}
