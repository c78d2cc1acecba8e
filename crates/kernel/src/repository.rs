use async_trait::async_trait;
use thiserror::Error;

use crate::entity::Book;

/// Text every backend includes when a requested document does not exist.
pub const DOCUMENT_NOT_FOUND: &str = "document not found";

/// Failures reported by a [`BookRepository`] backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("document not found: {id}")]
    DocumentNotFound { id: String },

    #[error("get error: {0}")]
    Read(String),

    #[error("get all query error: {0}")]
    Query(String),

    #[error("upsert error: {0}")]
    Write(String),
}

impl StorageError {
    /// Whether this error means the requested document is absent.
    ///
    /// Backends that only surface driver text are still recognised through
    /// the [`DOCUMENT_NOT_FOUND`] sentinel.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DocumentNotFound { .. })
            || self.to_string().contains(DOCUMENT_NOT_FOUND)
    }
}

/// Storage port for book records.
///
/// Implementations must be safe to share between concurrent requests. Every
/// call touches a single document; there are no transactions.
#[async_trait]
pub trait BookRepository: Send + Sync + 'static {
    /// Fetch the book stored under `id`.
    async fn get(&self, id: &str) -> Result<Book, StorageError>;

    /// Fetch every stored book in storage-defined order.
    async fn get_all(&self) -> Result<Vec<Book>, StorageError>;

    /// Create or fully replace the book stored under `id`.
    async fn upsert(&self, id: &str, book: &Book) -> Result<(), StorageError>;
}
