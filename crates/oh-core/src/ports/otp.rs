use async_trait::async_trait;

use crate::api::ApiError;
use crate::ids::UserId;
use crate::verification::{OtpCode, VerificationTarget};

/// One-time code endpoints. Both calls return the server's message.
#[async_trait]
pub trait OtpPort: Send + Sync {
    async fn send_otp(&self, target: &VerificationTarget) -> Result<String, ApiError>;

    async fn verify_otp(&self, user_id: &UserId, code: &OtpCode) -> Result<String, ApiError>;
}
