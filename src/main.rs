use clap::Parser;
use lodestone::authz::Auth;
use lodestone::session::DbSessionStore;
use lodestone::settings::Settings;
use lodestone::{storage, web};
use migration::MigratorTrait;
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "lodestone", version, about = "Rule-based authorization service")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    // load settings
    let settings = Settings::load(&cli.config)?;
    tracing::info!(?settings, "Loaded configuration");

    // init storage (database) and apply migrations
    let db = storage::init(&settings.database).await?;
    migration::Migrator::up(&db, None).await.into_diagnostic()?;

    // rule lists persist to the properties table in at-login mode
    let sessions = Arc::new(DbSessionStore::new(db.clone()));
    let auth = Arc::new(Auth::new(db, settings.auth.clone(), sessions));

    // start web server
    web::serve(&settings, auth).await?;
    Ok(())
}
