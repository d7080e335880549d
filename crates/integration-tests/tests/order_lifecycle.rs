//! The order to invoice to payment lifecycle, end to end over the core types.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use rust_decimal::Decimal;

use bosco_core::{
    CartItem, DeliveryType, Invoice, InvoiceError, InvoiceRecipient, NewOrder, OrderId,
    OrderStatus, PaymentState, ProductId, UserId,
};

fn checkout(prices_and_quantities: &[(i64, u32)]) -> NewOrder {
    NewOrder {
        items: prices_and_quantities
            .iter()
            .map(|&(price, quantity)| CartItem {
                product_id: ProductId::generate(),
                name: "Ankara Senator Set".to_string(),
                price: Decimal::from(price),
                quantity,
                image: None,
                size: Some("L".to_string()),
                color: None,
            })
            .collect(),
        shipping_address: "4 Admiralty Way, Lekki".to_string(),
        shipping_phone: "+2348012345678".to_string(),
        delivery_type: DeliveryType::Waybill,
        notes: None,
    }
}

#[test]
fn test_priced_order_invoice_totals() {
    let mut order = checkout(&[(2000, 2), (1000, 1)])
        .into_order(OrderId::generate(), Some(UserId::generate()), Utc::now())
        .unwrap();
    assert_eq!(order.item_price, Decimal::from(5000));
    assert_eq!(order.total_price, None);
    assert_eq!(order.payment_state(), PaymentState::Unpaid);

    let total = order.apply_shipping_fee(Decimal::from(500)).unwrap();
    assert_eq!(total, Decimal::from(5500));

    let recipient = InvoiceRecipient::from_profile("Tunde", "tunde@example.com");
    let invoice = Invoice::snapshot(&order, recipient, Utc::now()).unwrap();
    assert_eq!(invoice.item_price, Decimal::from(5000));
    assert_eq!(invoice.shipping_fee, Decimal::from(500));
    assert_eq!(invoice.total_price, Decimal::from(5500));
    assert_eq!(invoice.amount_due().minor_units(), Some(550_000));
}

#[test]
fn test_invoicing_twice_gives_distinct_snapshots() {
    let mut order = checkout(&[(45000, 1)])
        .into_order(OrderId::generate(), None, Utc::now())
        .unwrap();
    order.apply_shipping_fee(Decimal::from(3500)).unwrap();

    let first = Invoice::snapshot(&order, InvoiceRecipient::guest(), Utc::now()).unwrap();
    let second = Invoice::snapshot(&order, InvoiceRecipient::guest(), Utc::now()).unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.items, second.items);
    assert_eq!(first.email, "");
}

#[test]
fn test_requoting_resets_status_and_leaves_invoices_alone() {
    let mut order = checkout(&[(10000, 1)])
        .into_order(OrderId::generate(), None, Utc::now())
        .unwrap();
    assert!(matches!(
        Invoice::snapshot(&order, InvoiceRecipient::guest(), Utc::now()),
        Err(InvoiceError::OrderNotPriced)
    ));

    order.apply_shipping_fee(Decimal::from(1000)).unwrap();
    let invoice = Invoice::snapshot(&order, InvoiceRecipient::guest(), Utc::now()).unwrap();

    order.status = OrderStatus::Processing;
    order.apply_shipping_fee(Decimal::from(2500)).unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_price, Some(Decimal::from(12500)));
    assert_eq!(invoice.total_price, Decimal::from(11000));
}

#[test]
fn test_status_vocabulary_round_trips() {
    for status in OrderStatus::ALL {
        assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), *status);
    }
    assert!("shipped".parse::<OrderStatus>().is_err());
}
