//! SHELF application library
//!
//! Wires the `auth` and `books` modules onto the kernel and exposes the
//! entrypoints shared by the `shelf` binary and `shelf-cli`.

pub mod modules;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use shelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sqlx::PgPool;

use modules::books::store::{BookStoreArc, MemoryBookStore, PgBookStore};

pub use modules::*;

/// Where books are kept for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    InMemory,
}

/// Build a registry holding every module, all sharing `store`.
pub fn build_registry(settings: &Settings, store: BookStoreArc) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings, store)?;
    Ok(registry)
}

/// The complete HTTP application for `registry`.
pub fn app(registry: &ModuleRegistry, settings: &Settings) -> Router {
    shelf_http::build_router(registry, &settings.server)
}

/// Boot modules, serve until a shutdown signal, then stop modules in
/// reverse order.
pub async fn run(settings: Settings, backend: StoreBackend) -> anyhow::Result<()> {
    let pool = match backend {
        StoreBackend::Postgres => Some(
            shelf_db::connect(&settings.database)
                .await
                .context("failed to open book store")?,
        ),
        StoreBackend::InMemory => {
            tracing::warn!("using the in-memory book store; data is lost on shutdown");
            None
        }
    };

    let store: BookStoreArc = match &pool {
        Some(pool) => Arc::new(PgBookStore::new(pool.clone())),
        None => Arc::new(MemoryBookStore::new()),
    };

    let registry = build_registry(&settings, store)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    if let Some(pool) = &pool {
        apply_migrations(pool, &registry).await?;
    }
    registry.start_all(&ctx).await?;

    let served = shelf_http::start_server(app(&registry, &settings), &settings.server).await;

    let stopped = registry.stop_all().await;
    if let Some(pool) = pool {
        pool.close().await;
    }

    served?;
    stopped
}

/// Connect to the configured database and apply pending module migrations.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let pool = shelf_db::connect(&settings.database)
        .await
        .context("failed to open book store")?;

    let registry = build_registry(settings, Arc::new(PgBookStore::new(pool.clone())))?;
    let applied = apply_migrations(&pool, &registry).await;

    pool.close().await;
    applied
}

async fn apply_migrations(pool: &PgPool, registry: &ModuleRegistry) -> anyhow::Result<usize> {
    shelf_db::migrate(pool, &registry.collect_migrations())
        .await
        .context("failed to apply migrations")
}
