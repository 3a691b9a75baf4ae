//! Registration fee payment.
//!
//! Outcomes only ever come from a [`crate::ports::PaymentGatewayPort`]; this
//! module holds no settlement logic.

use serde::{Deserialize, Serialize};

use crate::ids::{PaymentReference, ServiceCode, UserId};

/// Amount in whole taka.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(u32);

impl Amount {
    pub const fn taka(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "৳{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Bkash,
    Nagad,
}

impl PaymentMethod {
    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Bkash => "BKASH",
            PaymentMethod::Nagad => "NAGAD",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bkash" => Ok(PaymentMethod::Bkash),
            "nagad" => Ok(PaymentMethod::Nagad),
            other => Err(format!("unsupported payment method: {other}")),
        }
    }
}

/// Everything the payment modal shows and forwards to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: Amount,
    pub payee_name: String,
    pub payee_id: Option<UserId>,
    pub service_code: Option<ServiceCode>,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentOutcome {
    Succeeded {
        method: PaymentMethod,
        reference: PaymentReference,
    },
    Failed {
        reason: String,
    },
}

impl PaymentOutcome {
    pub const FAILED_MESSAGE: &'static str = "Payment failed. Please try again.";

    pub fn is_success(&self) -> bool {
        matches!(self, PaymentOutcome::Succeeded { .. })
    }

    pub fn message(&self) -> String {
        match self {
            PaymentOutcome::Succeeded { method, .. } => {
                format!("Payment successful via {}!", method.display_name())
            }
            PaymentOutcome::Failed { reason } if !reason.is_empty() => reason.clone(),
            PaymentOutcome::Failed { .. } => Self::FAILED_MESSAGE.to_string(),
        }
    }
}
