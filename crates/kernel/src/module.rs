use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// Everything a module may look at while booting.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

/// One schema step owned by a module. `up` may hold several statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

impl Migration {
    pub const fn new(id: &'static str, up: &'static str) -> Self {
        Self { id, up }
    }
}

/// A self-contained slice of the application: its routes, schema and
/// lifecycle hooks. Dependencies (stores, token services) are handed to
/// the module when it is constructed, never looked up globally.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name, used in logs and as the migration namespace.
    fn name(&self) -> &'static str;

    /// Runs before migrations.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes with absolute paths and their state already applied.
    /// The router is merged at the application root.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths` and `components.schemas`) merged into the
    /// served document.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Schema steps, applied in the order returned.
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Runs after migrations, before the listener accepts requests.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after the server has drained.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
