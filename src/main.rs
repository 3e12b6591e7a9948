use anyhow::Context;
use shelf_app::StoreBackend;
use shelf_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load SHELF settings")?;
    shelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.redacted_url(),
        "shelf starting"
    );

    shelf_app::run(settings, StoreBackend::Postgres).await
}
