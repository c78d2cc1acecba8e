use async_trait::async_trait;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;

use tracker_kernel::settings::DatabaseSettings;
use tracker_kernel::{Book, BookRepository, StorageError};

/// Table holding book records, keyed by ISBN.
pub const BOOK_TABLE: &str = "book";

/// SurrealDB-backed book store.
///
/// The endpoint scheme picks the transport (`ws://`, `http://`, ...). The
/// client handle is cheap to clone and safe to share between requests.
#[derive(Clone)]
pub struct SurrealBookStore {
    db: Surreal<Any>,
}

impl SurrealBookStore {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, surrealdb::Error> {
        let db = any::connect(settings.endpoint.as_str()).await?;

        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            db.signin(Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await?;
        }

        db.use_ns(settings.namespace.as_str())
            .use_db(settings.database.as_str())
            .await?;

        Ok(Self { db })
    }
}

#[async_trait]
impl BookRepository for SurrealBookStore {
    async fn get(&self, id: &str) -> Result<Book, StorageError> {
        let record: Option<Book> = self
            .db
            .select((BOOK_TABLE, id.to_owned()))
            .await
            .map_err(|e| StorageError::Read(e.to_string()))?;

        record.ok_or_else(|| StorageError::DocumentNotFound { id: id.to_owned() })
    }

    async fn get_all(&self) -> Result<Vec<Book>, StorageError> {
        tracing::trace!(target: "tracker-db", table = BOOK_TABLE, "selecting all books");

        let books: Vec<Book> = self
            .db
            .select(BOOK_TABLE)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        Ok(books)
    }

    async fn upsert(&self, id: &str, book: &Book) -> Result<(), StorageError> {
        let _: Option<Book> = self
            .db
            .upsert((BOOK_TABLE, id.to_owned()))
            .content(book.clone())
            .await
            .map_err(|e| StorageError::Write(e.to_string()))?;

        Ok(())
    }
}
