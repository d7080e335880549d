//! Catalog reads with an in-process cache.
//!
//! Product listings and detail pages are cached with `moka` for 5 minutes.
//! Every catalog write goes through this service and drops the whole cache,
//! so a new product or featured toggle is visible on the next request.
//!
//! Entries are tagged with the cache generation current when their database
//! read started. A write bumps the generation, so a read that was in flight
//! during the write can still insert its result, but that entry is never
//! served.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use bosco_core::{NewProduct, Product, ProductId};

use crate::db::{ProductFilter, ProductRepository, RepositoryError};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum CacheKey {
    Product(ProductId),
    Listing(ProductFilter),
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Arc<Product>),
    Listing(Arc<Vec<Product>>),
}

#[derive(Debug, Clone)]
struct Entry {
    generation: u64,
    value: CacheValue,
}

/// Cached catalog access. Cheap to clone.
#[derive(Clone)]
pub struct CatalogService {
    cache: Cache<CacheKey, Entry>,
    generation: Arc<AtomicU64>,
}

impl Default for CatalogService {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogService {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();
        Self {
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// A cached value, unless it was read before the last write.
    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        self.cache
            .get(key)
            .await
            .filter(|entry| entry.generation == self.current_generation())
            .map(|entry| entry.value)
    }

    async fn store(&self, key: CacheKey, generation: u64, value: CacheValue) {
        self.cache.insert(key, Entry { generation, value }).await;
    }

    /// List products matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the catalog cannot be read.
    #[instrument(skip(self, pool))]
    pub async fn list(
        &self,
        pool: &PgPool,
        filter: ProductFilter,
    ) -> Result<Arc<Vec<Product>>, RepositoryError> {
        let key = CacheKey::Listing(filter);
        if let Some(CacheValue::Listing(products)) = self.cached(&key).await {
            debug!("Catalog listing cache hit");
            return Ok(products);
        }

        let generation = self.current_generation();
        let products = Arc::new(ProductRepository::new(pool).list(filter).await?);
        self.store(key, generation, CacheValue::Listing(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such product exists.
    #[instrument(skip(self, pool), fields(product_id = %id))]
    pub async fn get(&self, pool: &PgPool, id: ProductId) -> Result<Arc<Product>, RepositoryError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cached(&key).await {
            return Ok(product);
        }

        let generation = self.current_generation();
        let product = ProductRepository::new(pool)
            .get(id)
            .await?
            .map(Arc::new)
            .ok_or(RepositoryError::NotFound)?;
        self.store(key, generation, CacheValue::Product(Arc::clone(&product)))
            .await;
        Ok(product)
    }

    /// Validate and list a new product. It starts out not featured.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the insert fails. Validation errors are
    /// the caller's to report; pass an already-validated `NewProduct`.
    #[instrument(skip(self, pool, new_product), fields(name = %new_product.name))]
    pub async fn create(
        &self,
        pool: &PgPool,
        new_product: NewProduct,
    ) -> Result<Product, RepositoryError> {
        let product = new_product.into_product(ProductId::generate(), Utc::now());
        ProductRepository::new(pool).create(&product).await?;
        self.invalidate_all().await;
        Ok(product)
    }

    /// Set or clear the featured flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such product exists.
    #[instrument(skip(self, pool), fields(product_id = %id))]
    pub async fn set_featured(
        &self,
        pool: &PgPool,
        id: ProductId,
        featured: bool,
    ) -> Result<(), RepositoryError> {
        ProductRepository::new(pool).set_featured(id, featured).await?;
        self.invalidate_all().await;
        Ok(())
    }

    /// Drop every cached listing and product.
    pub async fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
