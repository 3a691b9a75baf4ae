use std::sync::Arc;

use tracing::{debug, info_span, Instrument};

use oh_core::api::ApiError;
use oh_core::ports::AuthPort;
use oh_core::user::{CurrentUser, PaymentStatus};

use super::AppStateContext;

#[derive(Debug, thiserror::Error)]
pub enum FetchCurrentUserError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("failed to persist session: {0}")]
    Persist(#[from] anyhow::Error),
}

/// Loads `GET /auth/user` and refreshes the cached session hints from it.
///
/// The backend is authoritative: verification and payment flags of a logged-in
/// session are overwritten with what the server reports.
pub struct FetchCurrentUser {
    auth: Arc<dyn AuthPort>,
    state: Arc<AppStateContext>,
}

impl FetchCurrentUser {
    pub fn new(auth: Arc<dyn AuthPort>, state: Arc<AppStateContext>) -> Self {
        Self { auth, state }
    }

    pub async fn execute(&self) -> Result<CurrentUser, FetchCurrentUserError> {
        let span = info_span!("usecase.fetch_current_user.execute");

        async {
            let user = self.auth.current_user().await?;
            debug!(user_id = %user.id, "current user fetched");

            self.state
                .update(|state| {
                    let session = &mut state.session;
                    if !session.authenticated {
                        return;
                    }
                    session.first_name = user.first_name.clone();
                    session.last_name = user.last_name.clone();
                    session.set_phone_verified(user.phone_verified);
                    session.set_email_verified(user.email_verified);
                    session.payment_made = user.payment_status == PaymentStatus::Paid;
                })
                .await?;

            Ok(user)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_state;
    use oh_core::ids::UserId;
    use oh_core::ports::mocks::MockAuth;
    use oh_core::session::Role;

    fn user() -> CurrentUser {
        serde_json::from_value(serde_json::json!({
            "id": 4,
            "first_name": "Nila",
            "last_name": "Akter",
            "roleName": "DataCollector",
            "phone_verified": true,
            "payment_status": "Paid"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn refreshes_flags_of_logged_in_session() {
        let mut auth = MockAuth::new();
        auth.expect_current_user().returning(|| Ok(user()));
        let state = memory_state();
        state
            .update(|s| {
                s.session.authenticated = true;
                s.session.role = Some(Role::Collector);
            })
            .await
            .unwrap();

        let fetched = FetchCurrentUser::new(Arc::new(auth), state.clone())
            .execute()
            .await
            .unwrap();

        assert_eq!(fetched.id, UserId::from(4));
        let session = state.session().await;
        assert!(session.phone_verified);
        assert!(session.payment_made);
        assert_eq!(session.full_name(), "Nila Akter");
    }

    #[tokio::test]
    async fn leaves_anonymous_session_untouched() {
        let mut auth = MockAuth::new();
        auth.expect_current_user().returning(|| Ok(user()));
        let state = memory_state();

        FetchCurrentUser::new(Arc::new(auth), state.clone())
            .execute()
            .await
            .unwrap();

        assert_eq!(state.session().await, Default::default());
    }
}
