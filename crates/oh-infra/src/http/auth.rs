use async_trait::async_trait;
use oh_core::api::ApiError;
use oh_core::contact::ContactType;
use oh_core::ids::UserId;
use oh_core::ports::{AuthPort, LoginCredentials};
use oh_core::session::LoginProfile;
use oh_core::user::{ApplicationDecision, CurrentUser, PaymentStatus, PendingApplication};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::client::{decode, message_or, BackendClient};

const LOGIN_PATH: &str = "/auth/login";
const LOGOUT_PATH: &str = "/auth/logout";
const CURRENT_USER_PATH: &str = "/auth/user";
const DECISION_PATH: &str = "/auth/approve-reject";
const PENDING_APPLICATIONS_PATH: &str = "/data/pending-application-table";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    id: UserId,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    phone_verified: bool,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    payment_made: Option<bool>,
    #[serde(default)]
    payment_status: Option<PaymentStatus>,
}

impl From<LoginResponse> for LoginProfile {
    fn from(r: LoginResponse) -> Self {
        let payment_made = r
            .payment_made
            .unwrap_or(r.payment_status == Some(PaymentStatus::Paid));
        LoginProfile {
            id: r.id,
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email.filter(|v| !v.is_empty()),
            phone: r.phone.filter(|v| !v.is_empty()),
            phone_verified: r.phone_verified,
            email_verified: r.email_verified,
            payment_made,
        }
    }
}

fn login_body(credentials: &LoginCredentials) -> Value {
    let mut body = Map::new();
    let key = match credentials.identifier_type() {
        ContactType::Email => "email",
        ContactType::Phone => "phone",
    };
    body.insert(key.into(), json!(credentials.identifier.trim()));
    body.insert("password".into(), json!(credentials.password));
    body.insert("account_type".into(), json!(credentials.role.account_type()));
    Value::Object(body)
}

fn decision_body(id: &UserId, decision: &ApplicationDecision) -> Value {
    match decision {
        ApplicationDecision::Approve => json!({ "id": id, "approved": true }),
        ApplicationDecision::Reject { contact } => {
            json!({ "id": id, "rejected": true, "contact": contact })
        }
    }
}

/// `/auth/user` answers either with the user itself or wrapped in `data`.
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if !map.contains_key("id") && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[async_trait]
impl AuthPort for BackendClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginProfile, ApiError> {
        let request = self
            .request(Method::POST, LOGIN_PATH)?
            .json(&login_body(credentials));
        let value = self.execute(request).await?;
        let profile: LoginResponse = decode(unwrap_data(value))?;
        info!(user_id = %profile.id, role = %credentials.role, "backend login accepted");
        Ok(profile.into())
    }

    async fn logout(&self) -> Result<String, ApiError> {
        let value = self.execute(self.request(Method::POST, LOGOUT_PATH)?).await?;
        Ok(message_or(&value, "Logged out successfully."))
    }

    async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        let value = self
            .execute(self.request(Method::GET, CURRENT_USER_PATH)?)
            .await?;
        decode(unwrap_data(value))
    }

    async fn pending_applications(&self) -> Result<Vec<PendingApplication>, ApiError> {
        let value = self
            .execute(self.request(Method::GET, PENDING_APPLICATIONS_PATH)?)
            .await?;
        if !value.is_array() {
            warn!("pending applications response is not a list, showing none");
            return Ok(Vec::new());
        }
        decode(value)
    }

    async fn decide_application(
        &self,
        id: &UserId,
        decision: &ApplicationDecision,
    ) -> Result<String, ApiError> {
        let request = self
            .request(Method::POST, DECISION_PATH)?
            .json(&decision_body(id, decision));
        let value = self.execute(request).await?;
        Ok(message_or(&value, ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::client::test_support::client_for;
    use mockito::{Matcher, Server};
    use oh_core::session::Role;

    fn credentials(identifier: &str, role: Role) -> LoginCredentials {
        LoginCredentials {
            identifier: identifier.into(),
            password: "secret1".into(),
            role,
        }
    }

    #[tokio::test]
    async fn login_posts_phone_identifier_with_account_type() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/login")
            .match_header("x-visitor-id", "visitor-test")
            .match_body(Matcher::Json(json!({
                "phone": "01712345678",
                "password": "secret1",
                "account_type": "dataCollector"
            })))
            .with_status(200)
            .with_body(
                r#"{"id": 12, "first_name": "Karim", "last_name": "Uddin",
                    "phone": "01712345678", "email": "", "phone_verified": true,
                    "email_verified": false, "payment_status": "Paid"}"#,
            )
            .create_async()
            .await;
        let client = client_for(&server);

        let profile = client
            .login(&credentials("01712345678", Role::Collector))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(profile.id, UserId::from(12));
        assert_eq!(profile.email, None);
        assert!(profile.phone_verified);
        assert!(profile.payment_made);
    }

    #[tokio::test]
    async fn login_uses_email_key_for_addresses() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/login")
            .match_body(Matcher::PartialJson(json!({
                "email": "admin@example.com",
                "account_type": "admin"
            })))
            .with_status(200)
            .with_body(r#"{"id": "3", "first_name": "Ayesha", "payment_made": false}"#)
            .create_async()
            .await;
        let client = client_for(&server);

        let profile = client
            .login(&credentials(" admin@example.com ", Role::Admin))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(profile.first_name, "Ayesha");
        assert!(!profile.payment_made);
    }

    #[tokio::test]
    async fn login_rejection_carries_field_errors() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth/login")
            .with_status(401)
            .with_body(r#"{"errors": {"password": ["Invalid credentials"]}}"#)
            .create_async()
            .await;
        let client = client_for(&server);

        let err = client
            .login(&credentials("01712345678", Role::Public))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(err.field_message("password"), Some("Invalid credentials"));
    }

    #[tokio::test]
    async fn current_user_accepts_wrapped_payload() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/auth/user")
            .with_status(200)
            .with_body(
                r#"{"message": "ok", "data": {"id": 44, "first_name": "Mina",
                    "roleName": "public", "children": [{"id": 45, "first_name": "Tuli"}]}}"#,
            )
            .create_async()
            .await;
        let client = client_for(&server);

        let user = client.current_user().await.unwrap();

        assert_eq!(user.id, UserId::from(44));
        assert_eq!(user.role_name.as_deref(), Some("public"));
        assert_eq!(user.children.len(), 1);
    }

    #[tokio::test]
    async fn decide_application_sends_reject_contact() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/approve-reject")
            .match_body(Matcher::Json(json!({
                "id": "8",
                "rejected": true,
                "contact": "01800000000"
            })))
            .with_status(200)
            .with_body(r#"{"status": "success", "message": "User Rafiq rejected successfully"}"#)
            .create_async()
            .await;
        let client = client_for(&server);

        let message = client
            .decide_application(
                &UserId::from(8),
                &ApplicationDecision::Reject {
                    contact: "01800000000".into(),
                },
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(message, "User Rafiq rejected successfully");
    }

    #[tokio::test]
    async fn logout_falls_back_to_local_message() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth/logout")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let client = client_for(&server);

        assert_eq!(client.logout().await.unwrap(), "Logged out successfully.");
    }

    #[tokio::test]
    async fn pending_applications_lists_table_rows() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/data/pending-application-table")
            .match_header("x-visitor-id", "visitor-test")
            .with_status(200)
            .with_body(
                r#"[{"id": 41, "firstName": "Rahim", "lastName": "Mia",
                     "email": "rahim@example.com", "appliedAt": "2025-01-02",
                     "paymentStatus": "Paid"}]"#,
            )
            .create_async()
            .await;
        let client = client_for(&server);

        let rows = client.pending_applications().await.unwrap();

        mock.assert_async().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, UserId::from(41));
        assert_eq!(rows[0].payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn pending_applications_treats_malformed_body_as_empty() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/pending-application-table")
            .with_status(200)
            .with_body(r#"{"detail": "nothing here"}"#)
            .create_async()
            .await;
        let client = client_for(&server);

        assert!(client.pending_applications().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pending_applications_reports_forbidden() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/pending-application-table")
            .with_status(403)
            .with_body(r#"{"detail": "You do not have permission to perform this action."}"#)
            .create_async()
            .await;
        let client = client_for(&server);

        let err = client.pending_applications().await.unwrap_err();
        assert_eq!(
            err.user_message("fallback"),
            "You do not have permission to perform this action."
        );
    }
}
