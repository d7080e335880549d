//! Bosco CLI - Database migrations, catalog seeding and reporting.
//!
//! # Usage
//!
//! ```bash
//! # Apply storefront database migrations
//! bosco-cli migrate
//!
//! # Seed the catalog (validate only with --dry-run)
//! bosco-cli seed products --file crates/cli/seed/catalog.yaml
//!
//! # Print order counters
//! bosco-cli stats orders
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bosco-cli")]
#[command(author, version, about = "Bosco Clothings CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Print statistics
    Stats {
        #[command(subcommand)]
        report: StatsReport,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// List products from a YAML catalog file
    Products {
        /// Path to the catalog YAML file
        #[arg(short, long)]
        file: String,

        /// Validate the file without writing anything
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum StatsReport {
    /// Total and same-day order counts
    Orders,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Products { file, dry_run } => {
                commands::seed::products(&file, dry_run).await?;
            }
        },
        Commands::Stats { report } => match report {
            StatsReport::Orders => commands::stats::orders().await?,
        },
    }
    Ok(())
}
