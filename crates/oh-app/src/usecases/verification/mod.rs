mod contact_verification;

pub use contact_verification::{
    ContactVerification, VerificationError, VerificationScope, INVALID_OTP_MESSAGE,
};
