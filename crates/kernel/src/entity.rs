use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Owner recorded on records created or updated by the service itself.
pub const DEFAULT_USER: &str = "SYSTEM";

/// Reading progress of a tracked book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadingStatus {
    #[serde(rename = "UNREAD")]
    Unread,
    #[serde(rename = "IN PROGRESS")]
    InProgress,
    #[serde(rename = "FINISHED")]
    Finished,
}

impl ReadingStatus {
    pub const ALL: [ReadingStatus; 3] = [Self::Unread, Self::InProgress, Self::Finished];

    /// Canonical wire form of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unread => "UNREAD",
            Self::InProgress => "IN PROGRESS",
            Self::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ReadingStatus {
    type Err = UnknownStatus;

    /// Case-insensitive match against the canonical names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == upper)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Field a book listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Status,
    Genre,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [Self::Title, Self::Status, Self::Genre];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Status => "status",
            Self::Genre => "genre",
        }
    }

    /// Compares two books on this key. Values compare case-sensitively and
    /// an absent status sorts as the empty string.
    pub fn compare(self, a: &Book, b: &Book) -> Ordering {
        match self {
            Self::Title => a.title.cmp(&b.title),
            Self::Status => a.status_str().cmp(b.status_str()),
            Self::Genre => a.genre.cmp(&b.genre),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sort key '{0}'")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == lower)
            .ok_or_else(|| UnknownSortKey(s.to_string()))
    }
}

/// A tracked book, keyed by ISBN.
///
/// The same shape is persisted by the storage backends and returned by the
/// HTTP API. Zero timestamps and empty owner fields are omitted on output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReadingStatus>,
    #[serde(skip_serializing_if = "is_zero_i64")]
    pub bookmark: i64,
    #[serde(skip_serializing_if = "is_zero_i64")]
    pub created: i64,
    #[serde(skip_serializing_if = "is_zero_i64")]
    pub updated: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created_by: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub updated_by: String,
    #[serde(skip_serializing_if = "is_zero_i64")]
    pub started: i64,
    #[serde(skip_serializing_if = "is_zero_i64")]
    pub finished: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
}

impl Book {
    /// Stamps creation and update metadata for a freshly created record.
    pub fn set_tracking_details(&mut self, now: i64) {
        self.created = now;
        self.updated = now;
        self.created_by = DEFAULT_USER.to_string();
        self.updated_by = DEFAULT_USER.to_string();
    }

    /// Stamps update metadata, keeping the creation metadata of `existing`.
    pub fn refresh_tracking_details(&mut self, existing: &Book, now: i64) {
        self.created = existing.created;
        self.created_by = existing.created_by.clone();
        self.updated = now;
        self.updated_by = DEFAULT_USER.to_string();
    }

    pub fn status_str(&self) -> &str {
        self.status.map_or("", ReadingStatus::as_str)
    }
}

/// Books sharing a genre, produced by the grouping query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooksByGenre {
    pub genre: String,
    pub count: usize,
    pub books: Vec<Book>,
}

impl BooksByGenre {
    pub fn new(genre: impl Into<String>, books: Vec<Book>) -> Self {
        Self {
            genre: genre.into(),
            count: books.len(),
            books,
        }
    }
}

fn is_zero_i64(value: &i64) -> bool {
    *value == 0
}
