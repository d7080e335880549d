//! Wishlist kept in the customer's session, one entry per product.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, ProductTag};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WishlistError {
    #[error("product is already in the wishlist")]
    AlreadyPresent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    pub tag: ProductTag,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    items: Vec<WishlistItem>,
}

impl Wishlist {
    /// # Errors
    ///
    /// Returns [`WishlistError::AlreadyPresent`] if the product is already saved.
    pub fn add(&mut self, item: WishlistItem) -> Result<(), WishlistError> {
        if self.contains(item.product_id) {
            return Err(WishlistError::AlreadyPresent);
        }
        self.items.push(item);
        Ok(())
    }

    /// Returns whether the product was present.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product_id != product_id);
        self.items.len() != before
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn beads(product_id: ProductId) -> WishlistItem {
        WishlistItem {
            product_id,
            name: "Coral Necklace".to_owned(),
            price: Decimal::from(18_000),
            image: None,
            tag: ProductTag::Beads,
        }
    }

    #[test]
    fn test_duplicate_add_is_rejected() {
        let id = ProductId::generate();
        let mut wishlist = Wishlist::default();
        wishlist.add(beads(id)).unwrap();
        assert_eq!(wishlist.add(beads(id)), Err(WishlistError::AlreadyPresent));
        assert_eq!(wishlist.items().len(), 1);
    }

    #[test]
    fn test_remove_and_contains() {
        let id = ProductId::generate();
        let mut wishlist = Wishlist::default();
        wishlist.add(beads(id)).unwrap();
        assert!(wishlist.contains(id));
        assert!(wishlist.remove(id));
        assert!(!wishlist.remove(id));
        assert!(!wishlist.contains(id));
    }
}
