use async_trait::async_trait;
use oh_core::payment::{PaymentOutcome, PaymentRequest};
use oh_core::ports::PaymentGatewayPort;
use tracing::error;

/// Gateway used when no payment provider is configured. Every attempt fails
/// without reaching any provider.
#[derive(Debug, Default)]
pub struct UnconfiguredPaymentGateway;

#[async_trait]
impl PaymentGatewayPort for UnconfiguredPaymentGateway {
    async fn pay(&self, request: &PaymentRequest) -> anyhow::Result<PaymentOutcome> {
        error!(amount = %request.amount, "payment attempted without a configured gateway");
        anyhow::bail!("no payment gateway is configured (set payment.mode)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oh_core::payment::{Amount, PaymentMethod};

    #[tokio::test]
    async fn every_payment_fails() {
        let request = PaymentRequest {
            amount: Amount::taka(500),
            payee_name: "Ayesha Begum".into(),
            payee_id: None,
            service_code: None,
            method: PaymentMethod::Nagad,
        };

        let err = UnconfiguredPaymentGateway.pay(&request).await.unwrap_err();

        assert!(err.to_string().contains("payment.mode"));
    }
}
