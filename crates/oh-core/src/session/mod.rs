//! Client-side session model.
//!
//! The session is informational caching of what the backend told us at login or
//! during signup. The backend stays authoritative for every business decision.

mod signup;
mod state;

pub use signup::{SignupDraft, SignupField};
pub use state::AppState;

use serde::{Deserialize, Serialize};

use crate::contact::{Contact, ContactType};
use crate::ids::UserId;
use crate::registration::RegistrationReceipt;

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Collector,
    Public,
}

impl Role {
    /// Value of the `account_type` field expected by `POST /auth/login`.
    pub fn account_type(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Collector => "dataCollector",
            Role::Public => "public",
        }
    }

    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::Collector => "/collector/dashboard",
            Role::Public => "/user/dashboard",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "collector" | "datacollector" => Ok(Role::Collector),
            "public" | "user" => Ok(Role::Public),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Collector => "collector",
            Role::Public => "public",
        };
        f.write_str(name)
    }
}

/// Profile returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub phone_verified: bool,
    pub email_verified: bool,
    pub payment_made: bool,
}

impl LoginProfile {
    /// Contact used to log in: the email when the identifier was an email.
    fn primary_contact(&self, identifier_type: ContactType) -> Option<(String, ContactType)> {
        let (preferred, fallback) = match identifier_type {
            ContactType::Email => (
                self.email.clone().map(|v| (v, ContactType::Email)),
                self.phone.clone().map(|v| (v, ContactType::Phone)),
            ),
            ContactType::Phone => (
                self.phone.clone().map(|v| (v, ContactType::Phone)),
                self.email.clone().map(|v| (v, ContactType::Email)),
            ),
        };
        preferred
            .filter(|(v, _)| !v.is_empty())
            .or(fallback.filter(|(v, _)| !v.is_empty()))
    }
}

/// Authentication and verification state of the current user.
///
/// `authenticated == true` implies `role.is_some()`; only [`Session::login`] sets
/// `authenticated`, and [`Session::normalized`] repairs persisted data that breaks
/// the rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub authenticated: bool,
    pub role: Option<Role>,
    pub first_name: String,
    pub last_name: String,
    pub phone_verified: bool,
    pub email_verified: bool,
    pub application_id: Option<UserId>,
    pub contact: Option<String>,
    pub contact_type: Option<ContactType>,
    pub payment_made: bool,
    pub allow_login_access_while_authenticated: bool,
}

impl Session {
    pub fn login(&mut self, profile: LoginProfile, role: Role, identifier_type: ContactType) {
        let contact = profile.primary_contact(identifier_type);
        self.authenticated = true;
        self.role = Some(role);
        self.first_name = profile.first_name;
        self.last_name = profile.last_name;
        self.phone_verified = profile.phone_verified;
        self.email_verified = profile.email_verified;
        self.application_id = Some(profile.id);
        self.contact_type = contact.as_ref().map(|(_, kind)| *kind);
        self.contact = contact.map(|(value, _)| value);
        self.payment_made = profile.payment_made;
        self.allow_login_access_while_authenticated = false;
    }

    pub fn logout(&mut self) {
        *self = Session::default();
    }

    pub fn set_phone_verified(&mut self, verified: bool) {
        self.phone_verified = verified;
    }

    pub fn set_email_verified(&mut self, verified: bool) {
        self.email_verified = verified;
    }

    pub fn set_allow_login_access(&mut self, allow: bool) {
        self.allow_login_access_while_authenticated = allow;
    }

    pub fn mark_contact_verified(&mut self, kind: ContactType) {
        match kind {
            ContactType::Phone => self.phone_verified = true,
            ContactType::Email => self.email_verified = true,
        }
    }

    pub fn is_contact_verified(&self) -> bool {
        self.phone_verified || self.email_verified
    }

    /// Role of an authenticated session, `None` otherwise.
    pub fn active_role(&self) -> Option<Role> {
        if self.authenticated {
            self.role
        } else {
            None
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Returns a copy that satisfies the authenticated-implies-role rule.
    pub fn normalized(self) -> Self {
        if self.authenticated && self.role.is_none() {
            #[cfg(feature = "tracing")]
            tracing::warn!("persisted session is authenticated without a role, discarding");
            Session::default()
        } else {
            self
        }
    }

    /// Account of a logged-in collector that still has to verify a contact.
    pub fn pending_verification(&self) -> Option<RegistrationReceipt> {
        if self.active_role() != Some(Role::Collector) || self.is_contact_verified() {
            return None;
        }
        let contact = self.contact.as_deref().filter(|c| !c.trim().is_empty())?;
        Some(RegistrationReceipt {
            application_id: self.application_id.clone()?,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            contact: Contact::new(contact, self.contact_type?),
        })
    }

    /// Route to land on right after a successful login.
    pub fn landing_path(&self) -> &'static str {
        match self.active_role() {
            Some(Role::Collector) if !self.is_contact_verified() => "/signup/collector/verify",
            Some(role) => role.dashboard_path(),
            None => "/login",
        }
    }
}
