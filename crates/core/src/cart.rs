//! Shopping cart kept in the customer's session.
//!
//! A cart line is identified by [`CartLineKey`]: the same product in two
//! sizes (or colors) is two lines, while adding an identical variant again
//! only bumps the quantity of the existing line.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{AmountError, ProductId, add_amounts, checked_amount};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("invalid price: {0}")]
    InvalidPrice(#[from] AmountError),
    #[error("cart total is too large")]
    AmountTooLarge,
    #[error("item is not in the cart")]
    NotInCart,
}

/// One line of a cart, also used as the item snapshot inside orders and
/// invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    /// Unit price as seen by the customer when the item was added.
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl CartItem {
    #[must_use]
    pub fn key(&self) -> CartLineKey {
        CartLineKey {
            product_id: self.product_id,
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }

    /// `price × quantity`, or `None` if it doesn't fit a money column.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .and_then(|total| checked_amount(total).ok())
    }

    fn matches(&self, key: &CartLineKey) -> bool {
        self.product_id == key.product_id && self.size == key.size && self.color == key.color
    }
}

/// Sum of `price × quantity` over `items`, or `None` once it no longer fits
/// a money column.
pub(crate) fn sum_lines(items: &[CartItem]) -> Option<Decimal> {
    items.iter().try_fold(Decimal::ZERO, |acc, line| {
        add_amounts(acc, line.line_total()?).ok()
    })
}

/// Identity of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineKey {
    pub product_id: ProductId,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add an item, merging with an existing line of the same variant.
    ///
    /// On merge the quantities are summed and the stored image is replaced
    /// when the new item carries one.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero quantity, a price that isn't a storable
    /// amount, or when the cart total would grow past
    /// [`MAX_AMOUNT`](crate::types::MAX_AMOUNT). The cart is unchanged on error.
    pub fn add(&mut self, item: CartItem) -> Result<(), CartError> {
        if item.quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }
        checked_amount(item.price)?;

        let mut items = self.items.clone();
        let key = item.key();
        match items.iter_mut().find(|line| line.matches(&key)) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(item.quantity);
                if item.image.is_some() {
                    line.image = item.image;
                }
            }
            None => items.push(item),
        }
        self.replace_items(items)
    }

    /// Set the quantity of a line. A quantity of zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if no line matches `key`, or
    /// [`CartError::AmountTooLarge`] if the new total would not fit.
    pub fn update_quantity(&mut self, key: &CartLineKey, quantity: u32) -> Result<(), CartError> {
        let index = self
            .items
            .iter()
            .position(|line| line.matches(key))
            .ok_or(CartError::NotInCart)?;

        if quantity == 0 {
            self.items.remove(index);
            return Ok(());
        }

        let mut items = self.items.clone();
        if let Some(line) = items.get_mut(index) {
            line.quantity = quantity;
        }
        self.replace_items(items)
    }

    fn replace_items(&mut self, items: Vec<CartItem>) -> Result<(), CartError> {
        sum_lines(&items).ok_or(CartError::AmountTooLarge)?;
        self.items = items;
        Ok(())
    }

    /// Remove a line. Returns whether anything was removed.
    pub fn remove(&mut self, key: &CartLineKey) -> bool {
        let before = self.items.len();
        self.items.retain(|line| !line.matches(key));
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Sum of `price × quantity` over all lines.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountTooLarge`] if the total does not fit a money
    /// column. Carts built through [`add`](Self::add) never do, but a cart
    /// read back from a session is not re-validated.
    pub fn total(&self) -> Result<Decimal, CartError> {
        sum_lines(&self.items).ok_or(CartError::AmountTooLarge)
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn senator(product_id: ProductId, size: &str, quantity: u32) -> CartItem {
        CartItem {
            product_id,
            name: "Senator Kaftan".to_owned(),
            price: Decimal::from(2500),
            quantity,
            image: None,
            size: Some(size.to_owned()),
            color: Some("navy".to_owned()),
        }
    }

    #[test]
    fn test_merges_identical_variant() {
        let id = ProductId::generate();
        let mut cart = Cart::new();
        cart.add(senator(id, "M", 1)).unwrap();
        cart.add(CartItem {
            image: Some("new.jpg".into()),
            ..senator(id, "M", 2)
        })
        .unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.count(), 3);
        assert_eq!(cart.items()[0].image.as_deref(), Some("new.jpg"));
    }

    #[test]
    fn test_different_sizes_are_separate_lines() {
        let id = ProductId::generate();
        let mut cart = Cart::new();
        cart.add(senator(id, "M", 1)).unwrap();
        cart.add(senator(id, "L", 1)).unwrap();
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.total(), Ok(Decimal::from(5000)));
    }

    #[test]
    fn test_update_to_zero_removes_line() {
        let id = ProductId::generate();
        let mut cart = Cart::new();
        cart.add(senator(id, "M", 2)).unwrap();
        let key = cart.items()[0].key();

        cart.update_quantity(&key, 5).unwrap();
        assert_eq!(cart.count(), 5);

        cart.update_quantity(&key, 0).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.update_quantity(&key, 1), Err(CartError::NotInCart));
    }

    #[test]
    fn test_rejects_zero_quantity_and_bad_prices() {
        let mut cart = Cart::new();
        let id = ProductId::generate();
        assert_eq!(cart.add(senator(id, "S", 0)), Err(CartError::ZeroQuantity));
        let negative = CartItem {
            price: Decimal::from(-5),
            ..senator(id, "S", 1)
        };
        assert_eq!(
            cart.add(negative),
            Err(CartError::InvalidPrice(AmountError::Negative))
        );
        let fractional_kobo = CartItem {
            price: Decimal::new(25_005, 3),
            ..senator(id, "S", 1)
        };
        assert_eq!(
            cart.add(fractional_kobo),
            Err(CartError::InvalidPrice(AmountError::TooPrecise))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_huge_price_is_rejected_without_panicking() {
        let id = ProductId::generate();
        let mut cart = Cart::new();
        let huge = CartItem {
            price: Decimal::MAX,
            ..senator(id, "M", 2)
        };
        assert_eq!(
            cart.add(huge),
            Err(CartError::InvalidPrice(AmountError::TooLarge))
        );

        let priciest = CartItem {
            price: crate::types::MAX_AMOUNT,
            ..senator(id, "M", 1)
        };
        cart.add(priciest.clone()).unwrap();
        assert_eq!(cart.add(priciest), Err(CartError::AmountTooLarge));
        assert_eq!(cart.count(), 1);

        let key = cart.items()[0].key();
        assert_eq!(
            cart.update_quantity(&key, u32::MAX),
            Err(CartError::AmountTooLarge)
        );
        assert_eq!(cart.count(), 1);
        assert_eq!(cart.total(), Ok(crate::types::MAX_AMOUNT));
    }

    #[test]
    fn test_total_of_unvalidated_session_cart() {
        let cart: Cart = serde_json::from_value(serde_json::json!([{
            "productId": ProductId::generate(),
            "name": "Senator Kaftan",
            "price": "79228162514264337593543950335",
            "quantity": 2
        }]))
        .unwrap();
        assert_eq!(cart.total(), Err(CartError::AmountTooLarge));
    }

    #[test]
    fn test_remove_only_touches_matching_variant() {
        let id = ProductId::generate();
        let mut cart = Cart::new();
        cart.add(senator(id, "M", 1)).unwrap();
        cart.add(senator(id, "L", 1)).unwrap();

        assert!(cart.remove(&senator(id, "L", 1).key()));
        assert!(!cart.remove(&senator(id, "XL", 1).key()));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].size.as_deref(), Some("M"));
    }
}
