//! Orders and shipping-fee pricing.
//!
//! An order is created unpriced: only `item_price` is known. The back-office
//! then quotes a shipping fee, which fixes `total_price`:
//!
//! ```text
//! created      item_price = Σ price × qty, shipping_fee = None, total_price = None
//! fee quoted   shipping_fee = fee,        total_price = item_price + fee
//! ```
//!
//! Nothing prevents the fee from being quoted again; the last quote wins.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{CartItem, sum_lines};
use crate::types::{
    AmountError, DeliveryType, OrderId, OrderStatus, PaymentState, UserId, add_amounts,
    checked_amount,
};

/// Number of orders returned per page by the back-office listing.
pub const ORDER_PAGE_SIZE: i64 = 10;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("order must contain at least one item")]
    NoItems,
    #[error("item quantity must be at least 1")]
    ZeroQuantity,
    #[error("invalid item price: {0}")]
    InvalidPrice(AmountError),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid shipping fee: {0}")]
    InvalidShippingFee(AmountError),
    #[error("order total is too large")]
    AmountTooLarge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub items: Vec<CartItem>,
    pub shipping_address: String,
    pub shipping_phone: String,
    pub delivery_type: DeliveryType,
    pub notes: Option<String>,
    pub item_price: Decimal,
    pub shipping_fee: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub status: OrderStatus,
    pub settled_by_paystack: bool,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Quote a shipping fee and recompute the total.
    ///
    /// Re-quoting puts the order back to [`OrderStatus::Pending`].
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidShippingFee`] for a fee that isn't a
    /// storable amount and [`OrderError::AmountTooLarge`] if the total would
    /// not fit. The order is unchanged on error.
    pub fn apply_shipping_fee(&mut self, fee: Decimal) -> Result<Decimal, OrderError> {
        let fee = checked_amount(fee).map_err(OrderError::InvalidShippingFee)?;
        let total =
            add_amounts(self.item_price, fee).map_err(|_| OrderError::AmountTooLarge)?;
        self.shipping_fee = Some(fee);
        self.total_price = Some(total);
        self.status = OrderStatus::Pending;
        Ok(total)
    }

    /// Whether a shipping fee has been quoted.
    #[must_use]
    pub const fn is_priced(&self) -> bool {
        self.total_price.is_some()
    }

    #[must_use]
    pub const fn payment_state(&self) -> PaymentState {
        PaymentState::from_settled(self.settled_by_paystack)
    }
}

/// Sum of `price × quantity` over `items`.
///
/// # Errors
///
/// Returns [`OrderError::AmountTooLarge`] if the sum does not fit a money column.
pub fn item_price(items: &[CartItem]) -> Result<Decimal, OrderError> {
    sum_lines(items).ok_or(OrderError::AmountTooLarge)
}

/// Checkout details submitted by the customer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<CartItem>,
    pub shipping_address: String,
    pub shipping_phone: String,
    pub delivery_type: DeliveryType,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewOrder {
    /// Validate the checkout and build an unpriced, unpaid order.
    ///
    /// Item prices are taken as submitted.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no items, any item has a zero quantity
    /// or a price that isn't a storable amount, the items add up to more than
    /// a money column holds, or the shipping address or phone is blank.
    pub fn into_order(
        self,
        id: OrderId,
        user_id: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::NoItems);
        }
        if self.items.iter().any(|item| item.quantity == 0) {
            return Err(OrderError::ZeroQuantity);
        }
        for item in &self.items {
            checked_amount(item.price).map_err(OrderError::InvalidPrice)?;
        }
        let item_price = item_price(&self.items)?;
        let shipping_address = self.shipping_address.trim().to_owned();
        if shipping_address.is_empty() {
            return Err(OrderError::MissingField("shippingAddress"));
        }
        let shipping_phone = self.shipping_phone.trim().to_owned();
        if shipping_phone.is_empty() {
            return Err(OrderError::MissingField("shippingPhone"));
        }

        Ok(Order {
            id,
            user_id,
            item_price,
            items: self.items,
            shipping_address,
            shipping_phone,
            delivery_type: self.delivery_type,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            shipping_fee: None,
            total_price: None,
            status: OrderStatus::Pending,
            settled_by_paystack: false,
            payment_reference: None,
            created_at: now,
            updated_at: None,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::types::ProductId;

    pub(crate) fn line(price: i64, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::generate(),
            name: "Three-piece Suit".to_owned(),
            price: Decimal::from(price),
            quantity,
            image: None,
            size: Some("L".to_owned()),
            color: None,
        }
    }

    pub(crate) fn checkout(items: Vec<CartItem>) -> NewOrder {
        NewOrder {
            items,
            shipping_address: "12 Allen Avenue, Ikeja".to_owned(),
            shipping_phone: "+2348012345678".to_owned(),
            delivery_type: DeliveryType::Waybill,
            notes: None,
        }
    }

    #[test]
    fn test_new_order_is_unpriced_and_pending() {
        let order = checkout(vec![line(2000, 2), line(1000, 1)])
            .into_order(OrderId::generate(), None, Utc::now())
            .unwrap();

        assert_eq!(order.item_price, Decimal::from(5000));
        assert_eq!(order.shipping_fee, None);
        assert_eq!(order.total_price, None);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_state(), PaymentState::Unpaid);
    }

    #[test]
    fn test_rejects_invalid_checkout() {
        let id = OrderId::generate();
        let now = Utc::now();
        assert_eq!(
            checkout(Vec::new()).into_order(id, None, now).unwrap_err(),
            OrderError::NoItems
        );
        assert_eq!(
            checkout(vec![line(100, 0)]).into_order(id, None, now).unwrap_err(),
            OrderError::ZeroQuantity
        );
        assert_eq!(
            checkout(vec![line(-100, 1)]).into_order(id, None, now).unwrap_err(),
            OrderError::InvalidPrice(AmountError::Negative)
        );
        let no_phone = NewOrder {
            shipping_phone: " ".into(),
            ..checkout(vec![line(100, 1)])
        };
        assert_eq!(
            no_phone.into_order(id, None, now).unwrap_err(),
            OrderError::MissingField("shippingPhone")
        );
    }

    #[test]
    fn test_shipping_fee_sets_total() {
        let mut order = checkout(vec![line(5000, 1)])
            .into_order(OrderId::generate(), None, Utc::now())
            .unwrap();
        order.status = OrderStatus::Processing;

        let total = order.apply_shipping_fee(Decimal::from(500)).unwrap();
        assert_eq!(total, Decimal::from(5500));
        assert_eq!(order.total_price, Some(order.item_price + Decimal::from(500)));
        assert_eq!(order.status, OrderStatus::Pending);

        // Re-quoting replaces the previous fee.
        order.apply_shipping_fee(Decimal::ZERO).unwrap();
        assert_eq!(order.total_price, Some(Decimal::from(5000)));
    }

    #[test]
    fn test_negative_shipping_fee_leaves_order_untouched() {
        let mut order = checkout(vec![line(5000, 1)])
            .into_order(OrderId::generate(), None, Utc::now())
            .unwrap();
        assert_eq!(
            order.apply_shipping_fee(Decimal::from(-1)),
            Err(OrderError::InvalidShippingFee(AmountError::Negative))
        );
        assert_eq!(
            order.apply_shipping_fee(Decimal::new(5001, 3)),
            Err(OrderError::InvalidShippingFee(AmountError::TooPrecise))
        );
        assert!(!order.is_priced());
    }

    #[test]
    fn test_oversized_amounts_are_errors_not_panics() {
        let id = OrderId::generate();
        let now = Utc::now();

        let huge = CartItem {
            price: Decimal::MAX,
            ..line(0, 2)
        };
        assert_eq!(
            checkout(vec![huge]).into_order(id, None, now).unwrap_err(),
            OrderError::InvalidPrice(AmountError::TooLarge)
        );

        // Each price fits a money column, but the quantity pushes it over.
        let pricey = CartItem {
            price: Decimal::from(6_000_000_000_i64),
            ..line(0, 2)
        };
        assert_eq!(
            checkout(vec![pricey]).into_order(id, None, now).unwrap_err(),
            OrderError::AmountTooLarge
        );
        assert_eq!(
            item_price(&[line(5_000_000_000, 1), line(5_000_000_000, 1)]),
            Err(OrderError::AmountTooLarge)
        );

        let mut order = checkout(vec![CartItem {
            price: crate::types::MAX_AMOUNT,
            ..line(0, 1)
        }])
        .into_order(id, None, now)
        .unwrap();
        assert_eq!(
            order.apply_shipping_fee(Decimal::ONE),
            Err(OrderError::AmountTooLarge)
        );
        assert_eq!(
            order.apply_shipping_fee(Decimal::MAX),
            Err(OrderError::InvalidShippingFee(AmountError::TooLarge))
        );
        assert!(!order.is_priced());
    }
}
