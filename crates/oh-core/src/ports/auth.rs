use async_trait::async_trait;

use crate::api::ApiError;
use crate::contact::ContactType;
use crate::ids::UserId;
use crate::session::{LoginProfile, Role};
use crate::user::{ApplicationDecision, CurrentUser, PendingApplication};

/// Credentials submitted by the login form.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    /// Phone number or email address.
    pub identifier: String,
    pub password: String,
    pub role: Role,
}

impl LoginCredentials {
    pub fn identifier_type(&self) -> ContactType {
        ContactType::detect(&self.identifier)
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("identifier", &self.identifier)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Authentication endpoints.
#[async_trait]
pub trait AuthPort: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginProfile, ApiError>;

    /// Returns the server's confirmation message.
    async fn logout(&self) -> Result<String, ApiError>;

    async fn current_user(&self) -> Result<CurrentUser, ApiError>;

    /// Collector applications waiting for an admin decision.
    async fn pending_applications(&self) -> Result<Vec<PendingApplication>, ApiError>;

    /// Returns the server's confirmation message.
    async fn decide_application(
        &self,
        id: &UserId,
        decision: &ApplicationDecision,
    ) -> Result<String, ApiError>;
}
