//! View models returned by the account endpoints.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    #[default]
    Pending,
    Failed,
}

/// Dependent account listed under its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildAccount {
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub sub_account_status: Option<String>,
}

/// The logged-in user as reported by `GET /auth/user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, alias = "roleName")]
    pub role_name: Option<String>,
    #[serde(default)]
    pub phone_verified: bool,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub rejected: bool,
    /// Profile block, kept as raw JSON since its shape varies by role.
    #[serde(default)]
    pub profile: Option<serde_json::Value>,
    #[serde(default)]
    pub children: Vec<ChildAccount>,
}

impl CurrentUser {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Row of `GET /data/pending-application-table`: a collector application
/// waiting for an admin decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingApplication {
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub upazila: Option<String>,
    #[serde(default)]
    pub applied_at: String,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

impl PendingApplication {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Address a rejection notice goes to: the email when there is one.
    pub fn contact(&self) -> Option<&str> {
        [self.email.as_deref(), self.phone.as_deref()]
            .into_iter()
            .flatten()
            .find(|v| !v.trim().is_empty())
    }
}

/// Admin decision on a pending collector application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationDecision {
    Approve,
    Reject { contact: String },
}
