//! Document store backends implementing the book tracker storage port.

use std::sync::Arc;

use anyhow::Context;
use tracker_kernel::settings::DatabaseSettings;
use tracker_kernel::BookRepository;

pub mod memory;
pub mod surreal;

pub use memory::{Fault, MemoryBookStore};
pub use surreal::SurrealBookStore;

/// Endpoint value selecting the in-process store.
pub const MEMORY_ENDPOINT: &str = "memory";

/// Open the backend selected by `settings.endpoint`.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Arc<dyn BookRepository>> {
    if settings.endpoint == MEMORY_ENDPOINT {
        tracing::warn!(
            target: "tracker-db",
            "using in-memory book store; records are lost on shutdown"
        );
        return Ok(Arc::new(MemoryBookStore::new()));
    }

    let store = SurrealBookStore::connect(settings)
        .await
        .with_context(|| format!("failed to connect to document store at {}", settings.endpoint))?;

    tracing::info!(
        target: "tracker-db",
        endpoint = %settings.endpoint,
        namespace = %settings.namespace,
        database = %settings.database,
        "document store connected"
    );

    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_endpoint_selects_in_process_store() {
        let settings = DatabaseSettings {
            endpoint: MEMORY_ENDPOINT.to_string(),
            ..DatabaseSettings::default()
        };

        let store = connect(&settings).await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
    }
}
