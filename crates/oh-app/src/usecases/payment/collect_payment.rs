use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use oh_core::payment::{PaymentOutcome, PaymentRequest};
use oh_core::ports::{Notification, NotificationPort, PaymentGatewayPort};

#[derive(Debug, thiserror::Error)]
pub enum CollectPaymentError {
    #[error("{0}")]
    Declined(String),
    #[error("{message}")]
    Gateway {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Hands a fee to the payment gateway and reports the outcome.
pub struct CollectPayment {
    gateway: Arc<dyn PaymentGatewayPort>,
    notifier: Arc<dyn NotificationPort>,
}

impl CollectPayment {
    pub fn new(gateway: Arc<dyn PaymentGatewayPort>, notifier: Arc<dyn NotificationPort>) -> Self {
        Self { gateway, notifier }
    }

    pub async fn execute(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentOutcome, CollectPaymentError> {
        let span = info_span!(
            "usecase.collect_payment.execute",
            amount = %request.amount,
            method = request.method.display_name()
        );

        async {
            let outcome = match self.gateway.pay(request).await {
                Ok(outcome) => outcome,
                Err(source) => {
                    warn!(error = %source, "payment gateway error");
                    let message = PaymentOutcome::FAILED_MESSAGE.to_string();
                    self.notifier.notify(Notification::error(message.clone()));
                    return Err(CollectPaymentError::Gateway { message, source });
                }
            };

            let message = outcome.message();
            if outcome.is_success() {
                info!(?outcome, "payment settled");
                self.notifier.notify(Notification::success(message));
                Ok(outcome)
            } else {
                warn!(?outcome, "payment declined");
                self.notifier.notify(Notification::error(message.clone()));
                Err(CollectPaymentError::Declined(message))
            }
        }
        .instrument(span)
        .await
    }
}
