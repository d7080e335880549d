//! Seed the catalog from a YAML file.
//!
//! The file is parsed and every product validated before connecting, so a
//! typo never leaves a half-seeded catalog behind.
//!
//! ```yaml
//! products:
//!   - name: Ankara Senator Set
//!     description: Two-piece senator in wax print cotton.
//!     price: "45000"
//!     tag: senator
//!     images: [https://cdn.example.com/senator-1.jpg]
//!     sizeGuide: { M: "chest 40in", L: "chest 42in" }
//!     featured: true
//! ```

use std::path::Path;

use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info};

use bosco_core::{NewProduct, ProductId};
use bosco_storefront::db::{self, ProductRepository};

/// Top-level layout of the seed file.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<SeedProduct>,
}

/// A product to list, optionally featured straight away.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    #[serde(flatten)]
    pub product: NewProduct,
    #[serde(default)]
    pub featured: bool,
}

/// Parse and validate a catalog file without touching the database.
///
/// # Errors
///
/// Returns every validation failure, one line per product.
pub fn parse_catalog(content: &str) -> Result<Vec<SeedProduct>, Box<dyn std::error::Error>> {
    let file: CatalogFile = serde_yaml::from_str(content)?;

    let mut errors = Vec::new();
    let mut products = Vec::with_capacity(file.products.len());
    for (index, seed) in file.products.into_iter().enumerate() {
        let name = seed.product.name.clone();
        match seed.product.validate() {
            Ok(product) => products.push(SeedProduct {
                product,
                featured: seed.featured,
            }),
            Err(e) => errors.push(format!("product {} ({name}): {e}", index + 1)),
        }
    }

    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    Ok(products)
}

/// Insert every product in `file_path`.
///
/// # Errors
///
/// Returns an error if the file can't be read or validated, or an insert
/// fails. Products inserted before a failure stay in the catalog.
pub async fn products(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");
    let content = tokio::fs::read_to_string(path).await?;
    let products = parse_catalog(&content)?;
    info!(products = products.len(), "Catalog validated");

    if dry_run {
        info!("Dry run, nothing written");
        return Ok(());
    }

    let database_url = super::database_url()
        .ok_or("STOREFRONT_DATABASE_URL or DATABASE_URL not set")?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let repo = ProductRepository::new(&pool);
    let mut featured = 0;
    for seed in &products {
        let product = seed
            .product
            .clone()
            .into_product(ProductId::generate(), Utc::now());
        repo.create(&product).await?;
        if seed.featured {
            repo.set_featured(product.id, true).await?;
            featured += 1;
        }
        info!(product_id = %product.id, name = %product.name, "Product listed");
    }

    info!(inserted = products.len(), featured, "Seeding complete");
    Ok(())
}
