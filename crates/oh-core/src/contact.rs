use serde::{Deserialize, Serialize};

/// Kind of contact address a code is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Phone,
    Email,
}

impl ContactType {
    /// Classifies a raw contact value: anything containing `@` is an email.
    pub fn detect(value: &str) -> Self {
        if value.contains('@') {
            ContactType::Email
        } else {
            ContactType::Phone
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactType::Phone => "phone",
            ContactType::Email => "email",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContactType::Phone => "Phone Number",
            ContactType::Email => "Email Address",
        }
    }
}

impl std::fmt::Display for ContactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contact address together with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub value: String,
    pub kind: ContactType,
}

impl Contact {
    pub fn new(value: impl Into<String>, kind: ContactType) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }

    /// Trims the raw input and classifies it. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }
        Some(Self::new(value, ContactType::detect(value)))
    }
}

impl std::fmt::Display for Contact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}
