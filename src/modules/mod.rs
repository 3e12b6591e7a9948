pub mod auth;
pub mod books;

use std::sync::Arc;

use shelf_authz::{StaticAuthenticator, TokenService};
use shelf_kernel::{settings::Settings, ModuleRegistry};

use books::store::BookStoreArc;

/// Register every application module. `auth` comes first so it starts
/// before, and stops after, the routes it protects.
pub fn register_all(
    registry: &mut ModuleRegistry,
    settings: &Settings,
    store: BookStoreArc,
) -> anyhow::Result<()> {
    let tokens = Arc::new(TokenService::from_settings(&settings.auth));
    let authenticator = Arc::new(StaticAuthenticator::from_settings(&settings.auth));

    registry.register(Arc::new(auth::AuthModule::new(
        authenticator,
        tokens.clone(),
    )))?;
    registry.register(Arc::new(books::BooksModule::new(store, tokens)))?;
    Ok(())
}
