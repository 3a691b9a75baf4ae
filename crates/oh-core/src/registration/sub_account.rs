use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::profile::{BloodGroup, Gender, Relationship};
use super::{is_blank, Upload};
use crate::contact::{Contact, ContactType};
use crate::ids::UserId;
use crate::validation::ValidationError;

/// Public-user account a sub-account is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentAccount {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub child_count: u32,
}

impl ParentAccount {
    /// Codes for a sub-account go to the parent: phone when present, else email.
    pub fn contact(&self) -> Option<Contact> {
        match (&self.phone, &self.email) {
            (Some(phone), _) if !phone.trim().is_empty() => {
                Some(Contact::new(phone.trim(), ContactType::Phone))
            }
            (_, Some(email)) if !email.trim().is_empty() => {
                Some(Contact::new(email.trim(), ContactType::Email))
            }
            _ => None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Field bag collected by the sub-account wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubAccountDraft {
    pub parent: Option<ParentAccount>,
    pub first_name: String,
    pub last_name: String,
    pub name_bn: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub blood_group: Option<BloodGroup>,
    pub guardian_nid: String,
    pub relationship: Option<Relationship>,
    pub photo: Option<Upload>,
    pub signature: Option<Upload>,
}

impl SubAccountDraft {
    pub fn validate_parent(&self) -> Result<&ParentAccount, ValidationError> {
        self.parent.as_ref().ok_or(ValidationError::MissingParent)
    }

    /// Profile fields are checked before the parent, matching the details form.
    pub fn validate(&self) -> Result<Contact, ValidationError> {
        let missing_text = [&self.first_name, &self.last_name, &self.name_bn, &self.guardian_nid]
            .into_iter()
            .any(|value| is_blank(value));
        if missing_text
            || self.date_of_birth.is_none()
            || self.gender.is_none()
            || self.blood_group.is_none()
            || self.relationship.is_none()
            || self.photo.is_none()
            || self.signature.is_none()
        {
            return Err(ValidationError::MissingRequiredFields);
        }
        let parent = self.validate_parent()?;
        parent.contact().ok_or(ValidationError::MissingContact)
    }

    pub fn name_en(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}
