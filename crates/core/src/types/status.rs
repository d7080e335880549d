//! Closed vocabularies used across orders, invoices and the catalog.
//!
//! Every enum here is stored as lowercase text in Postgres and travels as the
//! same string over JSON, except [`PaymentState`] which mirrors the wire
//! format the payment confirmation page expects (`PAID` / `UNPAID`).

use serde::{Deserialize, Serialize};

/// Error returned when a string is not one of an enum's accepted values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct StatusParseError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Every accepted value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stored and wire representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = StatusParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(StatusParseError {
                        kind: $kind,
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

text_enum! {
    /// Fulfillment status of an order, set by the back-office.
    ///
    /// Also used for the (always `pending`) status of a freshly issued invoice.
    #[derive(Default)]
    OrderStatus, "status" {
        #[default]
        Pending => "pending",
        Processing => "processing",
        Delivered => "delivered",
    }
}

text_enum! {
    /// How the customer receives the parcel.
    DeliveryType, "delivery type" {
        /// Shipped by an interstate waybill carrier.
        Waybill => "waybill",
        /// Collected from the shop.
        Pickup => "pickup",
    }
}

text_enum! {
    /// Catalog category a product is filed under.
    ProductTag, "tag" {
        Traditional => "traditional",
        Suit => "suit",
        Senator => "senator",
        Beads => "beads",
    }
}

text_enum! {
    /// Payment verdict shown on the confirmation page.
    PaymentState, "payment state" {
        Paid => "PAID",
        Unpaid => "UNPAID",
    }
}

impl PaymentState {
    #[must_use]
    pub const fn from_settled(settled: bool) -> Self {
        if settled { Self::Paid } else { Self::Unpaid }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_parse() {
        assert_eq!("processing".parse::<OrderStatus>().unwrap(), OrderStatus::Processing);
        let err = "shipped".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid status: shipped");
        assert!("Pending".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_wire_format_matches_storage() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert_eq!(serde_json::to_string(&PaymentState::Unpaid).unwrap(), "\"UNPAID\"");
        assert_eq!(serde_json::to_string(&DeliveryType::Waybill).unwrap(), "\"waybill\"");
    }

    #[test]
    fn test_product_tags() {
        assert_eq!(ProductTag::ALL.len(), 4);
        assert_eq!("beads".parse::<ProductTag>().unwrap(), ProductTag::Beads);
        assert!(serde_json::from_str::<ProductTag>("\"hats\"").is_err());
    }

    #[test]
    fn test_payment_state_from_settled() {
        assert_eq!(PaymentState::from_settled(true), PaymentState::Paid);
        assert_eq!(PaymentState::from_settled(false), PaymentState::Unpaid);
    }
}
