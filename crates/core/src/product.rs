//! Catalog products.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{AmountError, ProductId, ProductTag, checked_amount};

/// Maximum number of images kept per product; extra uploads are dropped.
pub const MAX_PRODUCT_IMAGES: usize = 3;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid price: {0}")]
    InvalidPrice(#[from] AmountError),
}

/// A product as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub tag: ProductTag,
    pub images: Vec<String>,
    /// Size label to fit description, e.g. `"M" -> "chest 40in"`.
    pub size_guide: BTreeMap<String, String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the back-office when listing a new product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub tag: ProductTag,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub size_guide: BTreeMap<String, String>,
}

impl NewProduct {
    /// Check required fields and trim the image list to [`MAX_PRODUCT_IMAGES`].
    ///
    /// Blank image URLs are discarded before truncation.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or description is blank or the price is
    /// not a storable amount.
    pub fn validate(mut self) -> Result<Self, ProductError> {
        self.name = self.name.trim().to_owned();
        self.description = self.description.trim().to_owned();

        if self.name.is_empty() {
            return Err(ProductError::MissingField("name"));
        }
        if self.description.is_empty() {
            return Err(ProductError::MissingField("description"));
        }
        checked_amount(self.price)?;

        self.images.retain(|url| !url.trim().is_empty());
        self.images.truncate(MAX_PRODUCT_IMAGES);
        Ok(self)
    }

    /// Build the stored product. Call [`validate`](Self::validate) first.
    #[must_use]
    pub fn into_product(self, id: ProductId, created_at: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            tag: self.tag,
            images: self.images,
            size_guide: self.size_guide,
            featured: false,
            created_at,
        }
    }
}
