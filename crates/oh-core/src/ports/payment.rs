use async_trait::async_trait;

use crate::payment::{PaymentOutcome, PaymentRequest};

/// Settles a registration fee. The returned outcome is authoritative.
#[async_trait]
pub trait PaymentGatewayPort: Send + Sync {
    async fn pay(&self, request: &PaymentRequest) -> anyhow::Result<PaymentOutcome>;
}
