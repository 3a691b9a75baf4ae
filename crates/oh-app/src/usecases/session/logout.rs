use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use oh_core::ports::{AuthPort, Notification, NotificationPort};

use super::AppStateContext;

const LOGGED_OUT_MESSAGE: &str = "Logged out successfully.";

/// Ends the session on the server and always clears local state.
pub struct Logout {
    auth: Arc<dyn AuthPort>,
    state: Arc<AppStateContext>,
    notifier: Arc<dyn NotificationPort>,
}

impl Logout {
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

    pub async fn execute(&self) -> anyhow::Result<()> {
        let span = info_span!("usecase.logout.execute");

        async {
            let message = match self.auth.logout().await {
                Ok(message) if !message.is_empty() => message,
                Ok(_) => LOGGED_OUT_MESSAGE.to_string(),
                Err(err) => {
                    warn!(error = %err, "server logout failed, clearing local session anyway");
                    LOGGED_OUT_MESSAGE.to_string()
                }
            };

            self.state.clear().await?;
            info!("local session cleared");
            self.notifier.notify(Notification::success(message));
            Ok(())
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{memory_state, RecordingNotifier};
    use oh_core::api::ApiError;
    use oh_core::ports::mocks::MockAuth;
    use oh_core::route_guard::{RouteDecision, RouteGuard};
    use oh_core::session::{Role, SignupField};

    #[tokio::test]
    async fn logout_clears_session_even_when_server_fails() {
        let mut auth = MockAuth::new();
        auth.expect_logout()
            .returning(|| Err(ApiError::Transport("connection refused".into())));
        let state = memory_state();
        state
            .update(|s| {
                s.session.authenticated = true;
                s.session.role = Some(Role::Collector);
                s.session.phone_verified = true;
                s.signup.set_field(SignupField::FirstName, "Rahim");
            })
            .await
            .unwrap();
        let logout = Logout::new(Arc::new(auth), state.clone(), RecordingNotifier::arc());

        logout.execute().await.unwrap();

        let snapshot = state.snapshot().await;
        assert!(!snapshot.session.authenticated);
        assert_eq!(snapshot.session.role, None);
        assert!(!snapshot.session.phone_verified);
        assert_eq!(snapshot.signup.first_name, "");
        assert_eq!(
            RouteGuard::evaluate(&snapshot.session, "/collector/dashboard"),
            RouteDecision::Redirect("/login".into())
        );
    }

    #[tokio::test]
    async fn logout_reports_server_message() {
        let mut auth = MockAuth::new();
        auth.expect_logout()
            .returning(|| Ok("Successfully logged out.".into()));
        let notifier = RecordingNotifier::arc();
        let logout = Logout::new(Arc::new(auth), memory_state(), notifier.clone());

        logout.execute().await.unwrap();

        assert_eq!(notifier.messages(), vec!["Successfully logged out."]);
    }
}
