use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use oh_core::api::ApiError;
use oh_core::ports::{AuthPort, LoginCredentials, Notification, NotificationPort};
use oh_core::session::{AppState, Role, Session};

use super::AppStateContext;

pub const LOGIN_FAILED_MESSAGE: &str = "An unknown error occurred during login.";
pub const VERIFY_CONTACT_NOTICE: &str = "Please verify your contact information to proceed.";
pub const COMPLETE_PAYMENT_NOTICE: &str = "Please complete the payment to proceed.";

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Please provide a phone number or email address")]
    MissingIdentifier,
    #[error("{0}")]
    Rejected(String),
    #[error("failed to persist session: {0}")]
    Persist(#[from] anyhow::Error),
}

/// Authenticates against the backend and stores the resulting session.
pub struct Login {
    auth: Arc<dyn AuthPort>,
    state: Arc<AppStateContext>,
    notifier: Arc<dyn NotificationPort>,
}

/// What the caller needs to continue after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub session: Session,
    pub landing_path: String,
}

impl Login {
    pub fn new(
        auth: Arc<dyn AuthPort>,
        state: Arc<AppStateContext>,
        notifier: Arc<dyn NotificationPort>,
    ) -> Self {
        Self {
            auth,
            state,
            notifier,
        }
    }

    pub async fn execute(
        &self,
        identifier: &str,
        password: &str,
        role: Role,
    ) -> Result<LoginOutcome, LoginError> {
        let span = info_span!("usecase.login.execute", %role);

        async {
            let identifier = identifier.trim();
            if identifier.is_empty() {
                let err = LoginError::MissingIdentifier;
                self.notifier.notify(Notification::error(err.to_string()));
                return Err(err);
            }

            let credentials = LoginCredentials {
                identifier: identifier.to_string(),
                password: password.to_string(),
                role,
            };
            let identifier_type = credentials.identifier_type();

            let profile = match self.auth.login(&credentials).await {
                Ok(profile) => profile,
                Err(err) => return Err(self.fail(err)),
            };

            let session = self
                .state
                .update(|state| {
                    state.session.login(profile, role, identifier_type);
                    if role == Role::Collector && !state.session.is_contact_verified() {
                        resume_signup(state);
                    }
                    state.session.clone()
                })
                .await?;

            info!(user_id = ?session.application_id, "login succeeded");
            self.notifier.notify(Notification::success(success_message(role)));

            if role == Role::Collector {
                if !session.is_contact_verified() {
                    self.notifier
                        .notify(Notification::info(VERIFY_CONTACT_NOTICE));
                } else if !session.payment_made {
                    self.notifier
                        .notify(Notification::info(COMPLETE_PAYMENT_NOTICE));
                }
            }

            Ok(LoginOutcome {
                landing_path: session.landing_path().to_string(),
                session,
            })
        }
        .instrument(span)
        .await
    }

    fn fail(&self, err: ApiError) -> LoginError {
        warn!(error = %err, "login rejected");
        let message = err.user_message(LOGIN_FAILED_MESSAGE);
        self.notifier.notify(Notification::error(message.clone()));
        LoginError::Rejected(message)
    }
}

/// Seeds the signup draft so the verification page can pick up where the
/// collector left off.
fn resume_signup(state: &mut AppState) {
    let session = &state.session;
    let signup = &mut state.signup;
    signup.first_name = session.first_name.clone();
    signup.last_name = session.last_name.clone();
    signup.application_id = session.application_id.clone();
    signup.contact = session.contact.clone();
    signup.contact_type = session.contact_type;
}

fn success_message(role: Role) -> &'static str {
    match role {
        Role::Admin => "Admin login successful!",
        Role::Public => "Public user login successful!",
        Role::Collector => "Login successful!",
    }
}
