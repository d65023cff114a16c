//! Payment gateway abstraction.
//!
//! The live implementation talks to Razorpay; tests swap in a stub. The
//! trait only covers what checkout needs: creating a provider-side order
//! and verifying the signed confirmation the browser hands back.

use std::sync::Arc;

use anyhow::Result;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

mod razorpay;

pub use razorpay::RazorpayGateway;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Serialize)]
pub struct CreateGatewayOrder {
    /// Amount in the currency's minor unit (paise for INR).
    pub amount: i64,
    pub currency: String,
    /// Merchant-side reference, our order id.
    pub receipt: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: CreateGatewayOrder) -> Result<GatewayOrder>;
    /// Publishable key the browser checkout widget needs.
    fn client_key(&self) -> &str;
    /// Check the signature the provider attached to a completed payment.
    fn verify_signature(&self, gateway_order_id: &str, payment_id: &str, signature: &str) -> bool;
}

pub type DynPaymentGateway = Arc<dyn PaymentGateway>;

/// Signature over `"{gateway_order_id}|{payment_id}"`, HMAC-SHA256 keyed
/// with the gateway secret, hex encoded.
pub fn sign_payment(secret: &str, gateway_order_id: &str, payment_id: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("Invalid HMAC key: {}", e))?;
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a hex signature against the expected MAC.
pub fn verify_payment_signature(
    secret: &str,
    gateway_order_id: &str,
    payment_id: &str,
    signature: &str,
) -> bool {
    let Ok(provided) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.verify_slice(&provided).is_ok()
}
