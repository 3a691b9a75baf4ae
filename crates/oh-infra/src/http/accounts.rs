//! `/accounts/*`: registration, parent lookup and one-time codes.

use async_trait::async_trait;
use chrono::NaiveDate;
use oh_core::address::AddressSelection;
use oh_core::api::ApiError;
use oh_core::contact::{Contact, ContactType};
use oh_core::ids::UserId;
use oh_core::ports::{OtpPort, RegistrationPort};
use oh_core::registration::{
    ParentAccount, PublicRegistrationDraft, RegistrationReceipt, SubAccountDraft, Upload,
};
use oh_core::session::SignupDraft;
use oh_core::verification::{OtpCode, VerificationTarget};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use super::client::{decode, message_or, BackendClient};

const REGISTER_PATH: &str = "/accounts/register";
const PUBLIC_USER_PATH: &str = "/accounts/public-user";
const SEND_OTP_PATH: &str = "/accounts/send-otp";
const VERIFY_OTP_PATH: &str = "/accounts/verify-otp";

/// `for_account` values of the register endpoint.
#[derive(Debug, Clone, Copy)]
enum AccountKind {
    Collector,
    Public,
    SubAccount,
}

impl AccountKind {
    fn query(&self) -> [(&'static str, &'static str); 2] {
        let for_account = match self {
            AccountKind::Collector => "self",
            AccountKind::Public => "public",
            AccountKind::SubAccount => "sub_account",
        };
        [("identity", "DataCollector"), ("for_account", for_account)]
    }
}

#[derive(Debug, Deserialize)]
struct ReceiptBody {
    #[serde(default)]
    user_id: Option<UserId>,
    #[serde(default)]
    application_id: Option<UserId>,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    contact: Option<String>,
    #[serde(default)]
    contact_type: Option<ContactType>,
}

/// Reads a created account from the response, flat or wrapped in `data`.
/// Missing contact fields fall back to what was submitted.
fn parse_receipt(value: Value, submitted: Option<&Contact>) -> Result<RegistrationReceipt, ApiError> {
    let body = match value {
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    let body: ReceiptBody = decode(body)?;

    let application_id = body
        .user_id
        .or(body.application_id)
        .ok_or_else(|| ApiError::Decode("registration response has no user id".into()))?;
    let contact = match (body.contact.filter(|c| !c.trim().is_empty()), body.contact_type) {
        (Some(value), Some(kind)) => Contact::new(value, kind),
        (Some(value), None) => Contact::new(value.clone(), ContactType::detect(&value)),
        (None, _) => submitted
            .cloned()
            .ok_or_else(|| ApiError::Decode("registration response has no contact".into()))?,
    };

    Ok(RegistrationReceipt {
        application_id,
        first_name: body.first_name,
        last_name: body.last_name,
        contact,
    })
}

fn contact_entry(map: &mut Map<String, Value>, contact: &Contact) {
    map.insert(contact.kind.as_str().into(), json!(contact.value));
}

fn insert_text(map: &mut Map<String, Value>, key: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        map.insert(key.into(), json!(value));
    }
}

fn insert_date(map: &mut Map<String, Value>, date: Option<NaiveDate>) {
    // The backend model spells it `data_of_birth`.
    if let Some(date) = date {
        map.insert("data_of_birth".into(), json!(date.format("%Y-%m-%d").to_string()));
    }
}

fn insert_serialized<T: serde::Serialize>(map: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value.and_then(|v| serde_json::to_value(v).ok()) {
        map.insert(key.into(), value);
    }
}

fn address_json(selection: &AddressSelection) -> Value {
    let mut address = Map::new();
    let levels = [
        ("division", selection.division),
        ("zilla", selection.district),
        ("upazila", selection.upazila),
        ("union", selection.union),
        ("post_office", selection.post_office),
        ("village", selection.village),
        ("para", selection.para),
    ];
    for (key, id) in levels {
        if let Some(id) = id {
            address.insert(key.into(), json!(id));
        }
    }
    Value::Object(address)
}

fn collector_body(draft: &SignupDraft, contact: &Contact) -> Value {
    let mut body = Map::new();
    body.insert("first_name".into(), json!(draft.first_name.trim()));
    body.insert("last_name".into(), json!(draft.last_name.trim()));
    body.insert("password".into(), json!(draft.password));
    body.insert("confirm_password".into(), json!(draft.confirm_password));
    contact_entry(&mut body, contact);
    Value::Object(body)
}

fn public_parts(draft: &PublicRegistrationDraft, contact: &Contact) -> (Value, Value) {
    let mut user_data = Map::new();
    insert_text(&mut user_data, "first_name", &draft.first_name);
    insert_text(&mut user_data, "last_name", &draft.last_name);
    contact_entry(&mut user_data, contact);

    let mut profile = Map::new();
    profile.insert("name_en".into(), json!(draft.full_name()));
    insert_text(&mut profile, "name_bn", &draft.name_bn);
    insert_text(&mut profile, "father_name_en", &draft.father_name);
    insert_text(&mut profile, "mother_name_en", &draft.mother_name);
    insert_text(&mut profile, "spouse_name_en", &draft.spouse_name);
    insert_text(&mut profile, "nid", &draft.nid);
    insert_date(&mut profile, draft.date_of_birth);
    insert_serialized(&mut profile, "gender", draft.gender);
    insert_serialized(&mut profile, "blood_group", draft.blood_group);
    insert_text(&mut profile, "present_address", &draft.present_address);
    profile.insert("service_code".into(), json!(draft.service_code.as_str()));
    contact_entry(&mut profile, contact);
    profile.insert("address".into(), address_json(&draft.address));

    (Value::Object(user_data), Value::Object(profile))
}

fn sub_account_parts(draft: &SubAccountDraft, parent: &ParentAccount) -> (Value, Value) {
    let user_data = json!({
        "parent": parent.id,
        "first_name": draft.first_name.trim(),
        "last_name": draft.last_name.trim(),
        "sub_account_status": "Draft",
    });

    let mut profile = Map::new();
    profile.insert("name_en".into(), json!(draft.name_en()));
    insert_text(&mut profile, "name_bn", &draft.name_bn);
    insert_text(&mut profile, "guardian_nid", &draft.guardian_nid);
    insert_date(&mut profile, draft.date_of_birth);
    insert_serialized(&mut profile, "gender", draft.gender);
    insert_serialized(&mut profile, "blood_group", draft.blood_group);
    insert_serialized(&mut profile, "relationship", draft.relationship);

    (user_data, Value::Object(profile))
}

fn file_part(upload: &Upload) -> Result<Part, ApiError> {
    Part::bytes(upload.bytes.clone())
        .file_name(upload.file_name.clone())
        .mime_str(&upload.mime_type)
        .map_err(|e| ApiError::Transport(format!("invalid upload type '{}': {e}", upload.mime_type)))
}

fn with_files(
    mut form: Form,
    photo: Option<&Upload>,
    signature: Option<&Upload>,
) -> Result<Form, ApiError> {
    if let Some(photo) = photo {
        form = form.part("user_profile.photo", file_part(photo)?);
    }
    if let Some(signature) = signature {
        form = form.part("user_profile.signature", file_part(signature)?);
    }
    Ok(form)
}

/// Sub-account failures read best as "field name: message" built from the
/// first field error, e.g. "guardian nid: This field is required.".
fn sub_account_error(err: ApiError) -> ApiError {
    match err {
        ApiError::Status {
            status,
            message,
            field_errors,
        } => {
            let message = field_errors
                .first()
                .and_then(|e| {
                    e.messages
                        .first()
                        .map(|m| format!("{}: {m}", e.field.replacen('_', " ", 1)))
                })
                .unwrap_or(message);
            ApiError::Status {
                status,
                message,
                field_errors,
            }
        }
        other => other,
    }
}

#[derive(Debug, Deserialize)]
struct ParentRow {
    id: UserId,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    child_count: Option<u32>,
}

impl From<ParentRow> for ParentAccount {
    fn from(row: ParentRow) -> Self {
        ParentAccount {
            id: row.id,
            first_name: row.first_name.unwrap_or_default(),
            last_name: row.last_name.unwrap_or_default(),
            phone: row.phone.filter(|v| !v.trim().is_empty()),
            email: row.email.filter(|v| !v.trim().is_empty()),
            child_count: row.child_count.unwrap_or(0),
        }
    }
}

#[async_trait]
impl RegistrationPort for BackendClient {
    async fn register_collector(
        &self,
        draft: &SignupDraft,
        contact: &Contact,
    ) -> Result<RegistrationReceipt, ApiError> {
        let request = self
            .request(Method::POST, REGISTER_PATH)?
            .query(&AccountKind::Collector.query())
            .json(&collector_body(draft, contact));
        let receipt = parse_receipt(self.execute(request).await?, Some(contact))?;
        info!(application_id = %receipt.application_id, "collector registered");
        Ok(receipt)
    }

    async fn register_public_user(
        &self,
        draft: &PublicRegistrationDraft,
        contact: &Contact,
    ) -> Result<RegistrationReceipt, ApiError> {
        let (user_data, profile) = public_parts(draft, contact);
        let form = Form::new()
            .text("user_data", user_data.to_string())
            .text("user_profile", profile.to_string());
        let form = with_files(form, draft.photo.as_ref(), draft.signature.as_ref())?;

        let request = self
            .request(Method::POST, REGISTER_PATH)?
            .query(&AccountKind::Public.query())
            .multipart(form);
        let receipt = parse_receipt(self.execute(request).await?, Some(contact))?;
        info!(
            application_id = %receipt.application_id,
            service_code = %draft.service_code,
            "public user registered"
        );
        Ok(receipt)
    }

    async fn register_sub_account(
        &self,
        draft: &SubAccountDraft,
        parent: &ParentAccount,
    ) -> Result<RegistrationReceipt, ApiError> {
        let (user_data, profile) = sub_account_parts(draft, parent);
        let form = Form::new()
            .text("account_type", "sub-account")
            .text("user_data", user_data.to_string())
            .text("user_profile", profile.to_string());
        let form = with_files(form, draft.photo.as_ref(), draft.signature.as_ref())?;

        let request = self
            .request(Method::POST, REGISTER_PATH)?
            .query(&AccountKind::SubAccount.query())
            .multipart(form);
        let value = self.execute(request).await.map_err(sub_account_error)?;
        let receipt = parse_receipt(value, parent.contact().as_ref())?;
        info!(
            application_id = %receipt.application_id,
            parent_id = %parent.id,
            "sub-account registered"
        );
        Ok(receipt)
    }

    async fn search_parent_accounts(&self, term: &str) -> Result<Vec<ParentAccount>, ApiError> {
        let request = self
            .request(Method::GET, PUBLIC_USER_PATH)?
            .query(&[("param", term)]);
        let rows: Vec<ParentRow> = match self.execute(request).await? {
            Value::Null => Vec::new(),
            Value::Array(items) => decode(Value::Array(items))?,
            single => vec![decode(single)?],
        };
        Ok(rows.into_iter().map(ParentAccount::from).collect())
    }
}

#[async_trait]
impl OtpPort for BackendClient {
    async fn send_otp(&self, target: &VerificationTarget) -> Result<String, ApiError> {
        let request = self.request(Method::POST, SEND_OTP_PATH)?.json(&json!({
            "user_id": target.user_id,
            "contact": target.contact.value,
            "contact_type": target.contact.kind,
        }));
        let value = self.execute(request).await?;

        if value.get("send_otp").and_then(Value::as_bool) == Some(false) {
            return Err(ApiError::Status {
                status: 200,
                message: message_or(&value, ""),
                field_errors: Vec::new(),
            });
        }
        Ok(message_or(&value, "OTP sent"))
    }

    async fn verify_otp(&self, user_id: &UserId, code: &OtpCode) -> Result<String, ApiError> {
        let request = self.request(Method::POST, VERIFY_OTP_PATH)?.json(&json!({
            "user_id": user_id,
            "otp": code.as_str(),
        }));
        let value = self.execute(request).await?;
        Ok(message_or(&value, "OTP verified successfully"))
    }
}
