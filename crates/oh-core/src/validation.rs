//! Client-side validation failures.
//!
//! These are raised before any network call and carry the exact message shown
//! to the user.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ValidationError {
    #[error("Please provide a phone number or email address")]
    MissingContact,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,
    #[error("Please fill all required fields.")]
    MissingRequiredFields,
    #[error("No parent account selected. Please go back and select a parent.")]
    MissingParent,
    #[error("Please enter a valid 6-digit OTP.")]
    InvalidOtp,
    #[error("User ID not found. Cannot send OTP.")]
    MissingUserId,
    #[error("Contact is required to reject user")]
    MissingRejectionContact,
    #[error("Please select a payment method.")]
    MissingPaymentMethod,
}
