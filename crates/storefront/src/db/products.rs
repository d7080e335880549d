//! Product repository.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use bosco_core::{Product, ProductId, ProductTag};

use super::{RepositoryError, parse_column};

/// Name of the catalog size counter in `storefront.counters`.
const PRODUCT_COUNTER: &str = "products";

/// Optional filters for listing the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ProductFilter {
    pub tag: Option<ProductTag>,
    pub featured: Option<bool>,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    tag: String,
    images: Vec<String>,
    size_guide: Json<BTreeMap<String, String>>,
    featured: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            tag: parse_column(&row.tag, "product tag")?,
            images: row.images,
            size_guide: row.size_guide.0,
            featured: row.featured,
            created_at: row.created_at,
        })
    }
}

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored tag is invalid.
    pub async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, tag, images, size_guide, featured, created_at
            FROM storefront.products
            WHERE ($1::text IS NULL OR tag = $1)
              AND ($2::boolean IS NULL OR featured = $2)
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(filter.tag.map(ProductTag::as_str))
        .bind(filter.featured)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, tag, images, size_guide, featured, created_at
            FROM storefront.products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Insert a product and bump the catalog counter in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO storefront.products
                (id, name, description, price, tag, images, size_guide, featured, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.tag.as_str())
        .bind(&product.images)
        .bind(Json(&product.size_guide))
        .bind(product.featured)
        .bind(product.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO storefront.counters (name, value, updated_at)
            VALUES ($1, 1, NOW())
            ON CONFLICT (name)
            DO UPDATE SET value = counters.value + 1, updated_at = NOW()
            ",
        )
        .bind(PRODUCT_COUNTER)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Set the featured flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn set_featured(&self, id: ProductId, featured: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE storefront.products SET featured = $2 WHERE id = $1")
            .bind(id)
            .bind(featured)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
