use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::profile::{BloodGroup, Gender};
use super::{is_blank, Upload};
use crate::address::AddressSelection;
use crate::contact::Contact;
use crate::ids::ServiceCode;
use crate::validation::ValidationError;

/// Field bag collected by the public-user registration wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicRegistrationDraft {
    pub first_name: String,
    pub last_name: String,
    pub name_bn: String,
    pub father_name: String,
    pub mother_name: String,
    pub spouse_name: String,
    pub nid: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub blood_group: Option<BloodGroup>,
    pub contact_value: String,
    pub present_address: String,
    pub address: AddressSelection,
    pub service_code: ServiceCode,
    pub photo: Option<Upload>,
    pub signature: Option<Upload>,
}

impl PublicRegistrationDraft {
    pub fn new(service_code: ServiceCode) -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            name_bn: String::new(),
            father_name: String::new(),
            mother_name: String::new(),
            spouse_name: String::new(),
            nid: String::new(),
            date_of_birth: None,
            gender: None,
            blood_group: None,
            contact_value: String::new(),
            present_address: String::new(),
            address: AddressSelection::default(),
            service_code,
            photo: None,
            signature: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Contact is checked first, then the remaining required fields.
    pub fn validate(&self) -> Result<Contact, ValidationError> {
        let contact = Contact::parse(&self.contact_value).ok_or(ValidationError::MissingContact)?;
        if is_blank(&self.first_name)
            || is_blank(&self.last_name)
            || self.photo.is_none()
            || self.signature.is_none()
        {
            return Err(ValidationError::MissingRequiredFields);
        }
        Ok(contact)
    }
}
