use async_trait::async_trait;
use tokio::sync::RwLock;

use tracker_kernel::repository::DOCUMENT_NOT_FOUND;
use tracker_kernel::{Book, BookRepository, StorageError};

/// Failure a [`MemoryBookStore`] can be told to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Every `get` fails with a connectivity-style error.
    Get,
    /// Every `get` reports the document as missing, as text only.
    NotFound,
    /// Every `get_all` fails.
    GetAll,
    /// Every `upsert` fails.
    Upsert,
}

/// In-process book store keeping records in insertion order.
#[derive(Debug, Default)]
pub struct MemoryBookStore {
    records: RwLock<Vec<(String, Book)>>,
    faults: Vec<Fault>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `books`, keyed by their ISBN.
    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        let records = books
            .into_iter()
            .map(|book| (book.isbn.clone(), book))
            .collect();

        Self {
            records: RwLock::new(records),
            faults: Vec::new(),
        }
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.faults.push(fault);
        self
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn has_fault(&self, fault: Fault) -> bool {
        self.faults.contains(&fault)
    }
}

#[async_trait]
impl BookRepository for MemoryBookStore {
    async fn get(&self, id: &str) -> Result<Book, StorageError> {
        if self.has_fault(Fault::Get) {
            return Err(StorageError::Read("forced collection error".to_string()));
        }
        if self.has_fault(Fault::NotFound) {
            return Err(StorageError::Read(DOCUMENT_NOT_FOUND.to_string()));
        }

        self.records
            .read()
            .await
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, book)| book.clone())
            .ok_or_else(|| StorageError::DocumentNotFound { id: id.to_owned() })
    }

    async fn get_all(&self) -> Result<Vec<Book>, StorageError> {
        if self.has_fault(Fault::GetAll) {
            return Err(StorageError::Query("forced query error".to_string()));
        }

        Ok(self
            .records
            .read()
            .await
            .iter()
            .map(|(_, book)| book.clone())
            .collect())
    }

    async fn upsert(&self, id: &str, book: &Book) -> Result<(), StorageError> {
        if self.has_fault(Fault::Upsert) {
            return Err(StorageError::Write(
                "forced collection upsert error".to_string(),
            ));
        }

        let mut records = self.records.write().await;
        match records.iter_mut().find(|(key, _)| key == id) {
            Some((_, existing)) => *existing = book.clone(),
            None => records.push((id.to_owned(), book.clone())),
        }

        Ok(())
    }
}
