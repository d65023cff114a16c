use anyhow::Result;

use crate::config::RazorpayConfig;

use super::{CreateGatewayOrder, GatewayOrder, PaymentGateway};

const RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

pub struct RazorpayGateway {
    client: reqwest::Client,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    pub fn new(config: &RazorpayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        }
    }
}

#[async_trait::async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, request: CreateGatewayOrder) -> Result<GatewayOrder> {
        let response = self
            .client
            .post(format!("{}/orders", RAZORPAY_API_BASE))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Razorpay order creation failed with {}: {}", status, body);
            anyhow::bail!("Razorpay order creation failed with status {}", status);
        }

        Ok(response.json::<GatewayOrder>().await?)
    }

    fn client_key(&self) -> &str {
        &self.key_id
    }

    fn verify_signature(&self, gateway_order_id: &str, payment_id: &str, signature: &str) -> bool {
        super::verify_payment_signature(&self.key_secret, gateway_order_id, payment_id, signature)
    }
}
