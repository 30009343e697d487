use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use procurement_api::{db, migrator::Migrator};
use sea_orm_migration::MigratorTrait;
use tracing::info;

#[derive(Parser)]
#[command(name = "migration", about = "Apply or roll back the procurement schema", version)]
struct Cli {
    /// Database URL; defaults to the configured `database_url`
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending migrations (default)
    Up,
    /// Roll back the last `steps` migrations
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Print applied and pending migrations
    Status,
    /// Drop everything and re-apply
    Fresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    let database_url = match cli.database_url {
        Some(url) => url,
        None => procurement_api::config::load_config()
            .context("no --database-url given and configuration could not be loaded")?
            .database_url,
    };

    let conn = db::establish_connection(&database_url)
        .await
        .context("failed to connect to the database")?;

    match cli.command.unwrap_or(Command::Up) {
        Command::Up => Migrator::up(&conn, None).await?,
        Command::Down { steps } => Migrator::down(&conn, Some(steps)).await?,
        Command::Status => Migrator::status(&conn).await?,
        Command::Fresh => Migrator::fresh(&conn).await?,
    }

    info!("Migration command completed");
    Ok(())
}
