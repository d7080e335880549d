//! Invoices: frozen copies of a priced order.
//!
//! An invoice copies the order's items and amounts at the moment it is
//! issued and never follows later changes to the order. Issuing twice gives
//! two independent invoices.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::order::Order;
use crate::types::{CurrencyCode, DeliveryType, InvoiceId, OrderId, OrderStatus, Price, UserId};

/// Placeholder written when the customer record lacks a name or email.
const NOT_AVAILABLE: &str = "N/A";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvoiceError {
    #[error("order has no shipping fee yet")]
    OrderNotPriced,
}

/// Who the invoice is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRecipient {
    pub username: String,
    pub email: String,
}

impl InvoiceRecipient {
    /// Build from a customer record, substituting `N/A` for blank fields.
    #[must_use]
    pub fn from_profile(username: &str, email: &str) -> Self {
        let or_na = |value: &str| {
            let value = value.trim();
            let value = if value.is_empty() { NOT_AVAILABLE } else { value };
            value.to_owned()
        };
        Self {
            username: or_na(username),
            email: or_na(email),
        }
    }

    /// Recipient for the account behind an order, if any.
    ///
    /// Guest orders and orders whose account no longer exists are both
    /// addressed with empty fields.
    #[must_use]
    pub fn for_customer(profile: Option<(&str, &str)>) -> Self {
        profile.map_or_else(Self::guest, |(username, email)| {
            Self::from_profile(username, email)
        })
    }

    /// Recipient for an order placed without an account.
    #[must_use]
    pub const fn guest() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    pub order_id: OrderId,
    pub user_id: Option<UserId>,
    pub items: Vec<CartItem>,
    pub item_price: Decimal,
    pub shipping_fee: Decimal,
    pub total_price: Decimal,
    pub delivery_type: DeliveryType,
    pub notes: Option<String>,
    pub username: String,
    pub email: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Issue a new invoice for `order`.
    ///
    /// # Errors
    ///
    /// Returns [`InvoiceError::OrderNotPriced`] if no shipping fee has been
    /// quoted for the order.
    pub fn snapshot(
        order: &Order,
        recipient: InvoiceRecipient,
        now: DateTime<Utc>,
    ) -> Result<Self, InvoiceError> {
        let (Some(shipping_fee), Some(total_price)) = (order.shipping_fee, order.total_price)
        else {
            return Err(InvoiceError::OrderNotPriced);
        };

        Ok(Self {
            id: InvoiceId::generate(),
            order_id: order.id,
            user_id: order.user_id,
            items: order.items.clone(),
            item_price: order.item_price,
            shipping_fee,
            total_price,
            delivery_type: order.delivery_type,
            notes: order.notes.clone(),
            username: recipient.username,
            email: recipient.email,
            status: OrderStatus::Pending,
            created_at: now,
        })
    }

    /// Amount due, in the store currency.
    #[must_use]
    pub const fn amount_due(&self) -> Price {
        Price::new(self.total_price, CurrencyCode::NGN)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::order::tests::{checkout, line};

    fn priced_order() -> Order {
        let mut order = checkout(vec![line(2500, 2)])
            .into_order(OrderId::generate(), Some(UserId::generate()), Utc::now())
            .unwrap();
        order.apply_shipping_fee(Decimal::from(500)).unwrap();
        order
    }

    #[test]
    fn test_snapshot_copies_amounts() {
        let order = priced_order();
        let recipient = InvoiceRecipient::from_profile("ada", "ada@bosco.com");
        let invoice = Invoice::snapshot(&order, recipient, Utc::now()).unwrap();

        assert_eq!(invoice.item_price, Decimal::from(5000));
        assert_eq!(invoice.shipping_fee, Decimal::from(500));
        assert_eq!(invoice.total_price, Decimal::from(5500));
        assert_eq!(invoice.amount_due().minor_units(), Some(550_000));
        assert_eq!(invoice.status, OrderStatus::Pending);
        assert_eq!(invoice.order_id, order.id);
    }

    #[test]
    fn test_issuing_twice_gives_distinct_invoices() {
        let order = priced_order();
        let first = Invoice::snapshot(&order, InvoiceRecipient::guest(), Utc::now()).unwrap();
        let second = Invoice::snapshot(&order, InvoiceRecipient::guest(), Utc::now()).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(first.items, second.items);
    }

    #[test]
    fn test_snapshot_is_not_linked_to_order() {
        let mut order = priced_order();
        let invoice = Invoice::snapshot(&order, InvoiceRecipient::guest(), Utc::now()).unwrap();
        order.apply_shipping_fee(Decimal::from(9000)).unwrap();
        assert_eq!(invoice.total_price, Decimal::from(5500));
    }

    #[test]
    fn test_unpriced_order_is_rejected() {
        let order = checkout(vec![line(100, 1)])
            .into_order(OrderId::generate(), None, Utc::now())
            .unwrap();
        assert_eq!(
            Invoice::snapshot(&order, InvoiceRecipient::guest(), Utc::now()),
            Err(InvoiceError::OrderNotPriced)
        );
    }

    #[test]
    fn test_blank_profile_fields_become_na() {
        let recipient = InvoiceRecipient::from_profile("", "  ");
        assert_eq!(recipient.username, "N/A");
        assert_eq!(recipient.email, "N/A");
        assert_eq!(InvoiceRecipient::guest().email, "");
    }

    #[test]
    fn test_missing_account_is_addressed_like_a_guest() {
        assert_eq!(InvoiceRecipient::for_customer(None), InvoiceRecipient::guest());
        assert_eq!(
            InvoiceRecipient::for_customer(Some(("ada", "ada@bosco.com"))),
            InvoiceRecipient::from_profile("ada", "ada@bosco.com")
        );
    }
}
