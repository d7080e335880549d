//! Paystack payment handoff.
//!
//! The storefront never charges cards itself. It hands the browser the
//! parameters for the Paystack inline widget (amount in kobo, reference =
//! order id) and later learns about the charge from the Paystack webhook,
//! whose body is signed with HMAC-SHA512 keyed by the secret key.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use thiserror::Error;
use tracing::debug;

use bosco_core::{Email, Invoice, OrderId};

use crate::config::StorefrontConfig;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Webhook event emitted for a successful charge.
pub const CHARGE_SUCCESS: &str = "charge.success";

/// Errors from the payment handoff.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("invalid webhook signature: {0}")]
    InvalidSignature(String),

    #[error("malformed webhook payload: {0}")]
    MalformedEvent(String),

    #[error("invoice amount cannot be charged")]
    InvalidAmount,
}

/// Parameters for the Paystack inline checkout widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutParams {
    pub public_key: String,
    pub email: Email,
    /// Amount in kobo.
    pub amount: i64,
    /// The order id; Paystack echoes it back in the webhook.
    pub reference: OrderId,
    pub currency: &'static str,
    pub callback_url: String,
}

impl CheckoutParams {
    /// Build widget parameters for `invoice`, billed to `email`.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidAmount` if the invoice total is negative
    /// or does not fit in kobo.
    pub fn for_invoice(
        config: &StorefrontConfig,
        invoice: &Invoice,
        email: Email,
    ) -> Result<Self, PaymentError> {
        let amount_due = invoice.amount_due();
        let amount = amount_due
            .minor_units()
            .ok_or(PaymentError::InvalidAmount)?;

        Ok(Self {
            public_key: config.paystack.public_key.clone(),
            email,
            amount,
            reference: invoice.order_id,
            currency: amount_due.currency_code.code(),
            callback_url: config.payment_callback_url(),
        })
    }
}

/// The subset of a Paystack webhook event the storefront reads.
///
/// Only `event` is required; subscription, transfer and dispute events carry
/// other `data` shapes.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub data: WebhookData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl WebhookEvent {
    /// Parse a verified webhook body.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::MalformedEvent` if the JSON doesn't match.
    pub fn parse(body: &[u8]) -> Result<Self, PaymentError> {
        serde_json::from_slice(body).map_err(|e| PaymentError::MalformedEvent(e.to_string()))
    }

    /// The order this charge settles and the raw reference, for successful
    /// charges only.
    #[must_use]
    pub fn settled_order(&self) -> Option<(OrderId, &str)> {
        if self.event != CHARGE_SUCCESS {
            return None;
        }
        let reference = self.data.reference.as_deref()?;
        Some((reference.parse().ok()?, reference))
    }
}

/// Verify the `x-paystack-signature` header against the raw request body.
///
/// # Errors
///
/// Returns `PaymentError::InvalidSignature` if the signature doesn't match.
pub fn verify_signature(
    secret_key: &SecretString,
    body: &[u8],
    signature: &str,
) -> Result<(), PaymentError> {
    let mut mac = Hmac::<Sha512>::new_from_slice(secret_key.expose_secret().as_bytes())
        .map_err(|e| PaymentError::InvalidSignature(e.to_string()))?;

    mac.update(body);

    let expected = hex::encode(mac.finalize().into_bytes());

    if !constant_time_compare(&expected, &signature.trim().to_ascii_lowercase()) {
        return Err(PaymentError::InvalidSignature(
            "Signature mismatch".to_string(),
        ));
    }

    debug!("Paystack signature verified");

    Ok(())
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
    }

    #[test]
    fn test_verify_signature_accepts_valid() {
        let secret = SecretString::from("sk_test_9f8e7d6c5b4a");
        let body = br#"{"event":"charge.success","data":{"reference":"x"}}"#;
        let signature = sign("sk_test_9f8e7d6c5b4a", body);
        assert!(verify_signature(&secret, body, &signature).is_ok());
        assert!(verify_signature(&secret, body, &signature.to_uppercase()).is_ok());
    }

    #[test]
    fn test_verify_signature_rejects_tampered_body() {
        let secret = SecretString::from("sk_test_9f8e7d6c5b4a");
        let signature = sign("sk_test_9f8e7d6c5b4a", br#"{"amount":100}"#);
        assert!(matches!(
            verify_signature(&secret, br#"{"amount":999}"#, &signature),
            Err(PaymentError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_settled_order_only_for_charge_success() {
        let order_id = OrderId::generate();
        let body = format!(r#"{{"event":"charge.success","data":{{"reference":"{order_id}"}}}}"#);
        let event = WebhookEvent::parse(body.as_bytes()).unwrap();
        let reference = order_id.to_string();
        assert_eq!(event.settled_order(), Some((order_id, reference.as_str())));

        let body = format!(r#"{{"event":"transfer.success","data":{{"reference":"{order_id}"}}}}"#);
        let event = WebhookEvent::parse(body.as_bytes()).unwrap();
        assert_eq!(event.settled_order(), None);
    }

    #[test]
    fn test_events_without_reference_parse() {
        let event =
            WebhookEvent::parse(br#"{"event":"subscription.create","data":{"id":42,"status":"active"}}"#)
                .unwrap();
        assert_eq!(event.data.reference, None);
        assert_eq!(event.settled_order(), None);

        let event = WebhookEvent::parse(br#"{"event":"charge.success","data":{}}"#).unwrap();
        assert_eq!(event.settled_order(), None);

        let event = WebhookEvent::parse(br#"{"event":"invoice.update"}"#).unwrap();
        assert_eq!(event.settled_order(), None);
    }

    #[test]
    fn test_malformed_event() {
        assert!(matches!(
            WebhookEvent::parse(b"not json"),
            Err(PaymentError::MalformedEvent(_))
        ));
    }
}
