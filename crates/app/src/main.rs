use std::process::ExitCode;

use clap::Parser;
use engine::{Engine, SqliteStore};
use migration::{Migrator, MigratorTrait};

mod cli;
mod commands;
mod error;
mod settings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let settings = match settings::Settings::new(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("failed to load settings: {err}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ranger={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    match run(cli, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!("command failed: {err:?}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: cli::Cli, settings: settings::Settings) -> error::Result<()> {
    let url = cli
        .database_url
        .clone()
        .unwrap_or_else(|| settings.database.url());
    let database = parse_database(&url).await?;
    let engine = Engine::builder()
        .store(SqliteStore::new(database))
        .config(settings.ledger_config()?)
        .build()
        .await?;
    commands::dispatch(engine, cli.command).await
}

async fn parse_database(url: &str) -> error::Result<sea_orm::DatabaseConnection> {
    tracing::debug!(url, "opening database");
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
