use serde::{Deserialize, Serialize};
use thiserror::Error;

use tracker_http::response::Envelope;
use tracker_kernel::entity::UnknownSortKey;
use tracker_kernel::{Book, BooksByGenre, ReadingStatus, SortKey};

/// Request body for creating or updating a book.
///
/// Tracking metadata (`created`, `updated`, owners) is not accepted from
/// clients; the service stamps it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookPayload {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub status: Option<String>,
    pub bookmark: i64,
    pub started: i64,
    pub finished: i64,
    pub active: Option<String>,
}

/// Reasons a request is rejected before reaching the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid status key. Expected one of UNREAD, IN PROGRESS, FINISHED")]
    InvalidStatus,

    #[error("Invalid sort key. Expected: title, status or genre")]
    InvalidSortKey,
}

impl From<UnknownSortKey> for ValidationError {
    fn from(_: UnknownSortKey) -> Self {
        Self::InvalidSortKey
    }
}

impl BookPayload {
    /// Check required fields and the status, producing the domain record.
    pub fn into_book(self) -> Result<Book, ValidationError> {
        for (name, value) in [
            ("isbn", &self.isbn),
            ("title", &self.title),
            ("author", &self.author),
            ("genre", &self.genre),
        ] {
            if value.is_empty() {
                return Err(ValidationError::MissingField(name));
            }
        }

        let status = match self.status.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<ReadingStatus>()
                    .map_err(|_| ValidationError::InvalidStatus)?,
            ),
        };

        Ok(Book {
            isbn: self.isbn,
            title: self.title,
            author: self.author,
            genre: self.genre,
            status,
            bookmark: self.bookmark,
            started: self.started,
            finished: self.finished,
            active: self.active,
            ..Book::default()
        })
    }
}

/// Query string of the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub sort: String,
}

impl ListQuery {
    /// The sort key, if valid; the empty key is valid and means storage order.
    pub fn validated(self) -> Result<String, ValidationError> {
        if !self.sort.is_empty() {
            self.sort.parse::<SortKey>()?;
        }
        Ok(self.sort)
    }
}

/// Response body of the book endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<Book>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub books: Option<Vec<Book>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl BookResponse {
    pub fn single(message: impl Into<String>, book: Book) -> Self {
        Self {
            envelope: Envelope::ok(message),
            book: Some(book),
            books: None,
            count: None,
        }
    }

    pub fn list(message: impl Into<String>, books: Vec<Book>) -> Self {
        Self {
            envelope: Envelope::ok(message),
            book: None,
            count: Some(books.len()),
            books: Some(books),
        }
    }
}

/// Response body of the genre endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenreResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub genres: Vec<BooksByGenre>,
}

impl GenreResponse {
    pub fn new(message: impl Into<String>, genres: Vec<BooksByGenre>) -> Self {
        Self {
            envelope: Envelope::ok(message),
            genres,
        }
    }
}
