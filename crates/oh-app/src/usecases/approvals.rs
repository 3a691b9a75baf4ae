use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use oh_core::api::ApiError;
use oh_core::ids::UserId;
use oh_core::ports::{AuthPort, Notification, NotificationPort};
use oh_core::user::{ApplicationDecision, PendingApplication};
use oh_core::validation::ValidationError;

const APPROVE_FAILED_MESSAGE: &str = "Failed to approve collector.";
const REJECT_FAILED_MESSAGE: &str = "Failed to reject collector.";
const PENDING_FAILED_MESSAGE: &str = "Failed to fetch pending applications.";

#[derive(Debug, thiserror::Error)]
pub enum DecideApplicationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: ApiError,
    },
}

/// Admin review of collector applications: the pending list, approval and
/// rejection.
pub struct DecideApplication {
    auth: Arc<dyn AuthPort>,
    notifier: Arc<dyn NotificationPort>,
}

impl DecideApplication {
    pub fn new(auth: Arc<dyn AuthPort>, notifier: Arc<dyn NotificationPort>) -> Self {
        Self { auth, notifier }
    }

    pub async fn pending(&self) -> Result<Vec<PendingApplication>, DecideApplicationError> {
        let span = info_span!("usecase.decide_application.pending");

        async {
            let rows = self
                .auth
                .pending_applications()
                .await
                .map_err(|source| self.fail(source, PENDING_FAILED_MESSAGE))?;
            info!(count = rows.len(), "pending applications loaded");
            Ok(rows)
        }
        .instrument(span)
        .await
    }

    pub async fn approve(
        &self,
        id: &UserId,
        applicant_name: &str,
    ) -> Result<String, DecideApplicationError> {
        let span = info_span!("usecase.decide_application.approve", %id);

        async {
            match self.auth.decide_application(id, &ApplicationDecision::Approve).await {
                Ok(_) => {
                    info!("collector approved");
                    let message = format!("{} has been approved as a data collector!", applicant_name.trim());
                    self.notifier.notify(Notification::success(message.clone()));
                    Ok(message)
                }
                Err(source) => Err(self.fail(source, APPROVE_FAILED_MESSAGE)),
            }
        }
        .instrument(span)
        .await
    }

    /// Rejection needs the contact the backend notifies.
    pub async fn reject(&self, id: &UserId, contact: &str) -> Result<String, DecideApplicationError> {
        let span = info_span!("usecase.decide_application.reject", %id);

        async {
            let contact = contact.trim();
            if contact.is_empty() {
                let err = ValidationError::MissingRejectionContact;
                self.notifier.notify(Notification::error(err.to_string()));
                return Err(err.into());
            }

            let decision = ApplicationDecision::Reject {
                contact: contact.to_string(),
            };
            match self.auth.decide_application(id, &decision).await {
                Ok(message) => {
                    info!("collector rejected");
                    let message = if message.is_empty() {
                        "Application rejected.".to_string()
                    } else {
                        message
                    };
                    self.notifier.notify(Notification::success(message.clone()));
                    Ok(message)
                }
                Err(source) => Err(self.fail(source, REJECT_FAILED_MESSAGE)),
            }
        }
        .instrument(span)
        .await
    }

    fn fail(&self, source: ApiError, fallback: &str) -> DecideApplicationError {
        warn!(error = %source, "application review request failed");
        let message = source.user_message(fallback);
        self.notifier.notify(Notification::error(message.clone()));
        DecideApplicationError::Rejected { message, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingNotifier;
    use oh_core::ports::mocks::MockAuth;

    #[tokio::test]
    async fn reject_without_contact_makes_no_call() {
        let auth = MockAuth::new();
        let notifier = RecordingNotifier::arc();

        let err = DecideApplication::new(Arc::new(auth), notifier.clone())
            .reject(&UserId::from(5), "  ")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Contact is required to reject user");
        assert_eq!(notifier.errors(), vec!["Contact is required to reject user"]);
    }

    #[tokio::test]
    async fn approve_names_the_collector() {
        let mut auth = MockAuth::new();
        auth.expect_decide_application()
            .withf(|id, decision| id == &UserId::from(5) && *decision == ApplicationDecision::Approve)
            .returning(|_, _| Ok("User approved".into()));
        let notifier = RecordingNotifier::arc();

        let message = DecideApplication::new(Arc::new(auth), notifier.clone())
            .approve(&UserId::from(5), "Rahim Mia")
            .await
            .unwrap();

        assert_eq!(message, "Rahim Mia has been approved as a data collector!");
    }

    #[tokio::test]
    async fn approve_failure_falls_back_to_generic_message() {
        let mut auth = MockAuth::new();
        auth.expect_decide_application()
            .returning(|_, _| Err(ApiError::Transport("timeout".into())));
        let notifier = RecordingNotifier::arc();

        let err = DecideApplication::new(Arc::new(auth), notifier.clone())
            .approve(&UserId::from(5), "Rahim Mia")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), APPROVE_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn pending_failure_reports_server_detail() {
        let mut auth = MockAuth::new();
        auth.expect_pending_applications().returning(|| {
            Err(ApiError::from_response(
                403,
                r#"{"detail": "Admin access required"}"#,
            ))
        });
        let notifier = RecordingNotifier::arc();

        let err = DecideApplication::new(Arc::new(auth), notifier.clone())
            .pending()
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Admin access required");
        assert_eq!(notifier.errors(), vec!["Admin access required"]);
    }
}
