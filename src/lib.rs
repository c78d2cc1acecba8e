//! Book tracker service
//!
//! Modules assembled by the binary: book tracking endpoints backed by a
//! document store.

pub mod modules;

/// Re-export commonly used types
pub use modules::*;
