use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fulfill_data::RateCardLoader;
use fulfill_db_sqlite::SqliteRepository;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Load rate cards from a CSV file into the database.
///
/// The CSV file should have the following columns:
/// - card: The rate card name (e.g., standard, peak-season)
/// - rate: The dotted rate key (e.g., receiving.pallet_fee)
/// - amount: The price or fraction for that rate (e.g., 25.00 or 0.50)
#[derive(Parser, Debug)]
#[command(name = "rate-card-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing rate card data
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database URL (e.g., sqlite:fulfillment.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:fulfillment.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        info!("running migrations");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
    }

    if let Some(seeds_dir) = &args.seeds {
        info!(dir = %seeds_dir.display(), "running seeds");
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
    }

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = RateCardLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    info!(records = records.len(), file = %args.file.display(), "parsed rate card CSV");

    let saved = RateCardLoader::load(&repo, &records)
        .await
        .context("Failed to load rate cards into database")?;

    println!("Successfully loaded {} rate card(s) into the database.", saved);

    Ok(())
}
