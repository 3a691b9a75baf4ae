use serde::{Deserialize, Serialize};

use crate::contact::{Contact, ContactType};
use crate::ids::UserId;
use crate::registration::RegistrationReceipt;
use crate::validation::ValidationError;

/// Minimum password length accepted by the collector signup form.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Editable fields of the collector signup form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupField {
    FirstName,
    LastName,
    ContactInfo,
    Password,
    ConfirmPassword,
}

/// In-progress collector signup.
///
/// `verified` is only set through [`SignupDraft::mark_verified`], which requires
/// the application id of the verified account to match the stored one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupDraft {
    pub first_name: String,
    pub last_name: String,
    pub contact_info: String,
    #[serde(skip)]
    pub password: String,
    #[serde(skip)]
    pub confirm_password: String,
    pub application_id: Option<UserId>,
    pub contact: Option<String>,
    pub contact_type: Option<ContactType>,
    verified: bool,
}

impl SignupDraft {
    pub fn set_field(&mut self, field: SignupField, value: impl Into<String>) {
        let value = value.into();
        match field {
            SignupField::FirstName => self.first_name = value,
            SignupField::LastName => self.last_name = value,
            SignupField::ContactInfo => self.contact_info = value,
            SignupField::Password => self.password = value,
            SignupField::ConfirmPassword => self.confirm_password = value,
        }
    }

    pub fn reset(&mut self) {
        *self = SignupDraft::default();
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Stores what the backend returned for the created account.
    pub fn record_signup(&mut self, receipt: &RegistrationReceipt) {
        self.application_id = Some(receipt.application_id.clone());
        self.contact = Some(receipt.contact.value.clone());
        self.contact_type = Some(receipt.contact.kind);
        self.verified = false;
    }

    /// Marks the draft verified when `application_id` matches the stored one.
    pub fn mark_verified(&mut self, application_id: &UserId) -> bool {
        if self.application_id.as_ref() == Some(application_id) {
            self.verified = true;
        }
        self.verified
    }

    /// The accepted registration this draft still belongs to, if the backend
    /// already created the account.
    pub fn pending_receipt(&self) -> Option<RegistrationReceipt> {
        let application_id = self.application_id.clone()?;
        let contact = self.contact.as_deref().filter(|c| !c.trim().is_empty())?;
        let kind = self.contact_type?;
        Some(RegistrationReceipt {
            application_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            contact: Contact::new(contact, kind),
        })
    }

    /// Checks the form in the order the signup screen reports problems.
    pub fn validate(&self) -> Result<Contact, ValidationError> {
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort);
        }
        Contact::parse(&self.contact_info).ok_or(ValidationError::MissingContact)
    }
}
