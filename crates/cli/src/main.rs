use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_app::StoreBackend;
use shelf_authz::TokenService;
use shelf_kernel::settings::Settings;

/// Operate a SHELF book catalogue.
#[derive(Debug, Parser)]
#[command(name = "shelf-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API until Ctrl-C or SIGTERM.
    Serve {
        /// Keep books in memory instead of PostgreSQL.
        #[arg(long)]
        in_memory: bool,
    },
    /// Apply pending database migrations and exit.
    Migrate,
    /// Print a signed token for USERNAME using the configured secret.
    Token {
        #[arg(long, short)]
        username: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().context("failed to load SHELF settings")?;
    shelf_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve { in_memory } => {
            let backend = if in_memory {
                StoreBackend::InMemory
            } else {
                StoreBackend::Postgres
            };
            shelf_app::run(settings, backend).await
        }
        Command::Migrate => {
            let applied = shelf_app::migrate(&settings).await?;
            tracing::info!(applied, "migrate finished");
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Command::Token { username } => {
            let token = TokenService::from_settings(&settings.auth)
                .issue(&username)
                .context("failed to generate token")?;
            println!("{token}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_flag_parses() {
        let cli = Cli::try_parse_from(["shelf-cli", "serve", "--in-memory"]).unwrap();
        assert!(matches!(cli.command, Command::Serve { in_memory: true }));

        let cli = Cli::try_parse_from(["shelf-cli", "token", "--username", "admin"]).unwrap();
        assert!(matches!(cli.command, Command::Token { ref username } if username == "admin"));
    }
}
