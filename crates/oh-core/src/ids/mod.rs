mod id_macro;

use serde::Deserialize;

use id_macro::string_id;

string_id! {
    /// Backend user identifier.
    ///
    /// The backend uses the user id as the application id, so a single type
    /// covers both `user_id` and `application_id` fields. Deserializes from
    /// either a JSON string or a JSON integer.
    pub struct UserId;

    /// Identifier tagging a registration record (`SVC-<epoch millis>`).
    #[derive(Deserialize)]
    pub struct ServiceCode;

    /// Reference returned by a payment gateway for a settled payment.
    #[derive(Deserialize)]
    pub struct PaymentReference;

    /// Device fingerprint sent as `X-Visitor-ID`.
    #[derive(Deserialize)]
    pub struct VisitorId;
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => UserId::from(n),
            Raw::Text(s) => UserId(s),
        })
    }
}

impl ServiceCode {
    pub const PREFIX: &'static str = "SVC-";

    pub fn generate(now_ms: i64) -> Self {
        Self(format!("{}{}", Self::PREFIX, now_ms))
    }
}

impl PaymentReference {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for PaymentReference {
    fn default() -> Self {
        Self::new()
    }
}
