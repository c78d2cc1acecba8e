//! Core types shared by every book tracker crate: the book entity, the
//! storage port it is persisted through, layered settings, and the module
//! lifecycle used to assemble the service.

pub mod entity;
pub mod module;
pub mod registry;
pub mod repository;
pub mod settings;

pub use entity::{Book, BooksByGenre, ReadingStatus, SortKey};
pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
pub use repository::{BookRepository, StorageError};
