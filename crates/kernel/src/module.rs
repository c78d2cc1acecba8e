use async_trait::async_trait;
use axum::Router;

/// Context handed to modules during initialization and start-up
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// A unit of functionality mounted into the service
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name for this module, used in logs and OpenAPI tags
    fn name(&self) -> &'static str;

    /// Initialize the module; called once before any module is started
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes contributed by this module, mounted under `/api/v1`
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths` and `components.schemas`) for this module
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Called after every module has been initialized
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called during shutdown, in reverse registration order
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
