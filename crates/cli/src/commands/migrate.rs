//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! bosco-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded at
//! compile time. The server never runs them on startup.

use thiserror::Error;
use tracing::info;

use bosco_storefront::db;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: STOREFRONT_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending storefront migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = super::database_url().ok_or(MigrationError::MissingDatabaseUrl)?;

    info!("Connecting to storefront database...");
    let pool = db::create_pool(&database_url).await?;

    let migrator = sqlx::migrate!("../storefront/migrations");
    info!(migrations = migrator.iter().count(), "Running storefront migrations...");
    migrator.run(&pool).await?;

    info!("Storefront migrations complete");
    Ok(())
}
