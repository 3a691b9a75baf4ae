//! Registration drafts for the public-user and sub-account wizards.

mod profile;
mod public;
mod sub_account;

pub use profile::{BloodGroup, Gender, Relationship};
pub use public::PublicRegistrationDraft;
pub use sub_account::{ParentAccount, SubAccountDraft};

use serde::{Deserialize, Serialize};

use crate::contact::Contact;
use crate::ids::UserId;

/// An uploaded file (photo or signature).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Guesses the mime type from the file extension.
    pub fn from_file_name(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let mime_type = match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        };
        Self::new(file_name, mime_type, bytes)
    }
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// What the backend returns for a created account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    pub application_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub contact: Contact,
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
