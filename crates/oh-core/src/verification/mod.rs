//! Contact verification with one-time codes.

use serde::{Deserialize, Serialize};

use crate::contact::Contact;
use crate::ids::UserId;
use crate::validation::ValidationError;

pub const OTP_LENGTH: usize = 6;
pub const DEFAULT_RESEND_COOLDOWN_SECS: u64 = 60;

/// A well-formed one-time code: exactly six ASCII digits.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if can_submit_code(input) && input.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(input.to_string()))
        } else {
            Err(ValidationError::InvalidOtp)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OtpCode(******)")
    }
}

/// Whether the verify action may be offered for the current input.
pub fn can_submit_code(input: &str) -> bool {
    input.chars().count() == OTP_LENGTH
}

/// Account and address a code is issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationTarget {
    pub user_id: UserId,
    pub contact: Contact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationState {
    Unsent,
    Sent,
    Verified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationEvent {
    CodeSent,
    CodeAccepted,
}

impl VerificationState {
    /// `Verified` is absorbing; codes are only accepted after one was sent.
    pub fn transition(self, event: VerificationEvent) -> Self {
        match (self, event) {
            (VerificationState::Verified, _) => VerificationState::Verified,
            (_, VerificationEvent::CodeSent) => VerificationState::Sent,
            (VerificationState::Sent, VerificationEvent::CodeAccepted) => VerificationState::Verified,
            (state, _) => state,
        }
    }

    /// Sending is allowed before the first send and, afterwards, once the
    /// cooldown has run out.
    pub fn can_send(&self, cooldown_remaining_secs: u64) -> bool {
        match self {
            VerificationState::Unsent => true,
            VerificationState::Sent => cooldown_remaining_secs == 0,
            VerificationState::Verified => false,
        }
    }

    pub fn can_verify(&self) -> bool {
        matches!(self, VerificationState::Sent)
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationState::Verified)
    }
}
