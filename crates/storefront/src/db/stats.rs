//! View and order statistics.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sqlx::PgPool;

use bosco_core::{OrderStats, ProductId, ViewCounts};

use super::RepositoryError;
use super::orders::ORDER_COUNTER;

/// Repository for statistics counters.
pub struct StatsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count one view of `product_id` by `viewer` on `day`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn record_view(
        &self,
        product_id: ProductId,
        viewer: &str,
        day: NaiveDate,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM storefront.products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            r"
            INSERT INTO storefront.product_views (product_id, day, viewer, views)
            VALUES ($1, $2, $3, 1)
            ON CONFLICT (product_id, day, viewer)
            DO UPDATE SET views = product_views.views + 1
            ",
        )
        .bind(product_id)
        .bind(day)
        .bind(viewer)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Views of a product over the day, month and year containing `today`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_views(
        &self,
        product_id: ProductId,
        today: NaiveDate,
    ) -> Result<ViewCounts, RepositoryError> {
        let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);

        let per_day: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r"
            SELECT day, SUM(views)::bigint
            FROM storefront.product_views
            WHERE product_id = $1 AND day BETWEEN $2 AND $3
            GROUP BY day
            ",
        )
        .bind(product_id)
        .bind(year_start)
        .bind(today)
        .fetch_all(self.pool)
        .await?;

        Ok(ViewCounts::summarize(per_day, today))
    }

    /// Global and same-day order counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn order_stats(&self, today: NaiveDate) -> Result<OrderStats, RepositoryError> {
        let counter: Option<(i64, DateTime<Utc>)> = sqlx::query_as(
            "SELECT value, updated_at FROM storefront.counters WHERE name = $1",
        )
        .bind(ORDER_COUNTER)
        .fetch_optional(self.pool)
        .await?;

        let today_count: Option<i64> =
            sqlx::query_scalar("SELECT orders FROM storefront.daily_order_counts WHERE day = $1")
                .bind(today)
                .fetch_optional(self.pool)
                .await?;

        let (total_orders, last_updated) =
            counter.map_or((0, None), |(value, at)| (value, Some(at)));

        Ok(OrderStats {
            total_orders,
            today: today_count.unwrap_or(0),
            last_updated,
        })
    }
}
