//! Demonstration payment gateway.
//!
//! Waits for a fixed processing delay and then succeeds with a configurable
//! probability. Never settles anything; only selected with
//! `payment.mode = "simulated"`.

use std::time::Duration;

use async_trait::async_trait;
use oh_core::ids::PaymentReference;
use oh_core::payment::{PaymentOutcome, PaymentRequest};
use oh_core::ports::PaymentGatewayPort;
use rand::Rng;
use tracing::{info, warn};

pub const DEFAULT_SUCCESS_RATE: f64 = 0.8;
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_secs(3);

pub struct SimulatedPaymentGateway {
    success_rate: f64,
    processing_delay: Duration,
}

impl SimulatedPaymentGateway {
    /// `success_rate` is clamped to `0.0..=1.0`.
    pub fn new(success_rate: f64, processing_delay: Duration) -> Self {
        let success_rate = if success_rate.is_finite() {
            success_rate.clamp(0.0, 1.0)
        } else {
            DEFAULT_SUCCESS_RATE
        };
        warn!(
            success_rate,
            delay_ms = processing_delay.as_millis() as u64,
            "simulated payment gateway in use, no payment is settled"
        );
        Self {
            success_rate,
            processing_delay,
        }
    }
}

impl Default for SimulatedPaymentGateway {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_RATE, DEFAULT_PROCESSING_DELAY)
    }
}

#[async_trait]
impl PaymentGatewayPort for SimulatedPaymentGateway {
    async fn pay(&self, request: &PaymentRequest) -> anyhow::Result<PaymentOutcome> {
        tokio::time::sleep(self.processing_delay).await;

        let succeeded = rand::rng().random_bool(self.success_rate);
        let outcome = if succeeded {
            PaymentOutcome::Succeeded {
                method: request.method,
                reference: PaymentReference::new(),
            }
        } else {
            PaymentOutcome::Failed {
                reason: PaymentOutcome::FAILED_MESSAGE.to_string(),
            }
        };

        info!(
            amount = request.amount.value(),
            method = request.method.display_name(),
            payee = %request.payee_name,
            succeeded,
            "simulated payment processed"
        );
        Ok(outcome)
    }
}
