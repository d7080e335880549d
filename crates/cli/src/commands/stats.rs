//! Reporting commands.

use chrono::Utc;

use bosco_storefront::db::{self, StatsRepository};

/// Print total and same-day order counts.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the query fails.
pub async fn orders() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()
        .ok_or("STOREFRONT_DATABASE_URL or DATABASE_URL not set")?;
    let pool = db::create_pool(&database_url).await?;

    let stats = StatsRepository::new(&pool)
        .order_stats(Utc::now().date_naive())
        .await?;

    #[allow(clippy::print_stdout)]
    {
        println!("Total orders:  {}", stats.total_orders);
        println!("Orders today:  {}", stats.today);
        match stats.last_updated {
            Some(at) => println!("Last order at: {}", at.to_rfc3339()),
            None => println!("Last order at: never"),
        }
    }

    Ok(())
}
