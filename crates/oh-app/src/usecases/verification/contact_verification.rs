use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, info_span, warn, Instrument};

use oh_core::ports::{CooldownTimerPort, Notification, NotificationPort, OtpPort};
use oh_core::validation::ValidationError;
use oh_core::verification::{
    can_submit_code, OtpCode, VerificationEvent, VerificationState, VerificationTarget,
};

use crate::usecases::session::AppStateContext;

pub const INVALID_OTP_MESSAGE: &str = "Invalid OTP. Please try again.";
const SEND_FAILED_FALLBACK: &str = "An unknown error occurred";

/// Whose contact is being verified.
///
/// Only [`VerificationScope::OwnAccount`] touches the session flags and the
/// signup draft; verifying a registrant or a parent account leaves the
/// operator's session alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationScope {
    OwnAccount,
    ThirdParty,
}

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Please wait {remaining_secs}s before requesting a new OTP.")]
    CooldownActive { remaining_secs: u64 },
    #[error("Contact is already verified.")]
    AlreadyVerified,
    #[error("Please request an OTP first.")]
    CodeNotSent,
    #[error("Failed to send OTP: {0}")]
    SendFailed(String),
    #[error("{0}")]
    Rejected(String),
    #[error("failed to persist verification: {0}")]
    Persist(#[from] anyhow::Error),
}

struct Inner {
    target: Option<VerificationTarget>,
    state: VerificationState,
    cooldown: Option<watch::Receiver<u64>>,
}

/// Sends and checks one-time codes for a single contact and tracks the
/// resend cooldown.
pub struct ContactVerification {
    otp: Arc<dyn OtpPort>,
    cooldown: Arc<dyn CooldownTimerPort>,
    notifier: Arc<dyn NotificationPort>,
    app_state: Arc<AppStateContext>,
    cooldown_secs: u64,
    scope: VerificationScope,
    inner: Mutex<Inner>,
}

impl ContactVerification {
    pub fn new(
        otp: Arc<dyn OtpPort>,
        cooldown: Arc<dyn CooldownTimerPort>,
        notifier: Arc<dyn NotificationPort>,
        app_state: Arc<AppStateContext>,
        cooldown_secs: u64,
        scope: VerificationScope,
    ) -> Self {
        Self {
            otp,
            cooldown,
            notifier,
            app_state,
            cooldown_secs,
            scope,
            inner: Mutex::new(Inner {
                target: None,
                state: VerificationState::Unsent,
                cooldown: None,
            }),
        }
    }

    /// Points the step at a new contact. A different target restarts the
    /// verification from `Unsent`.
    pub async fn set_target(&self, target: Option<VerificationTarget>) {
        let mut inner = self.inner.lock().await;
        if inner.target == target {
            return;
        }
        if let Some(previous) = inner.target.as_ref() {
            if let Err(err) = self.cooldown.stop(&previous.user_id).await {
                warn!(error = %err, "failed to stop resend cooldown");
            }
        }
        debug!(target = ?target, "verification target changed");
        inner.target = target;
        inner.state = VerificationState::Unsent;
        inner.cooldown = None;
    }

    /// Points the step at a contact from an earlier run. A contact the backend
    /// already accepted stays `Verified`.
    pub async fn resume(&self, target: VerificationTarget, verified: bool) {
        self.set_target(Some(target)).await;
        if verified {
            self.inner.lock().await.state = VerificationState::Verified;
        }
    }

    pub async fn target(&self) -> Option<VerificationTarget> {
        self.inner.lock().await.target.clone()
    }

    pub async fn state(&self) -> VerificationState {
        self.inner.lock().await.state
    }

    pub async fn is_verified(&self) -> bool {
        self.state().await.is_verified()
    }

    /// Seconds left before another code may be requested.
    pub async fn cooldown_remaining(&self) -> u64 {
        let inner = self.inner.lock().await;
        remaining(&inner)
    }

    /// True exactly when a code was sent and the countdown reached zero.
    pub async fn can_resend(&self) -> bool {
        let inner = self.inner.lock().await;
        inner.state == VerificationState::Sent && remaining(&inner) == 0
    }

    /// Receiver that follows the countdown of the last send, if any.
    pub async fn watch_cooldown(&self) -> Option<watch::Receiver<u64>> {
        self.inner.lock().await.cooldown.clone()
    }

    pub async fn send_code(&self) -> Result<VerificationState, VerificationError> {
        let span = info_span!("usecase.contact_verification.send_code");

        async {
            let mut inner = self.inner.lock().await;
            let Some(target) = inner.target.clone() else {
                return Err(self.reject(ValidationError::MissingUserId.into()));
            };
            if inner.state.is_verified() {
                return Err(self.reject(VerificationError::AlreadyVerified));
            }
            let remaining_secs = remaining(&inner);
            if !inner.state.can_send(remaining_secs) {
                return Err(self.reject(VerificationError::CooldownActive { remaining_secs }));
            }

            let message = match self.otp.send_otp(&target).await {
                Ok(message) => message,
                Err(err) => {
                    warn!(error = %err, user_id = %target.user_id, "send otp failed");
                    let detail = err.user_message(SEND_FAILED_FALLBACK);
                    return Err(self.reject(VerificationError::SendFailed(detail)));
                }
            };
            debug!(server_message = %message, "otp sent");

            inner.state = inner.state.transition(VerificationEvent::CodeSent);
            inner.cooldown = match self.cooldown.start(&target.user_id, self.cooldown_secs).await {
                Ok(rx) => Some(rx),
                Err(err) => {
                    warn!(error = %err, "failed to start resend cooldown");
                    None
                }
            };

            info!(user_id = %target.user_id, contact_type = %target.contact.kind, "verification code sent");
            self.notifier
                .notify(Notification::success(format!("OTP sent to {}", target.contact)));
            Ok(inner.state)
        }
        .instrument(span)
        .await
    }

    pub async fn verify_code(&self, input: &str) -> Result<VerificationState, VerificationError> {
        let span = info_span!("usecase.contact_verification.verify_code");

        async {
            let input = input.trim();
            if !can_submit_code(input) {
                return Err(self.reject(ValidationError::InvalidOtp.into()));
            }
            let code = OtpCode::parse(input).map_err(|e| self.reject(e.into()))?;

            let mut inner = self.inner.lock().await;
            let Some(target) = inner.target.clone() else {
                return Err(self.reject(ValidationError::MissingUserId.into()));
            };
            if inner.state.is_verified() {
                return Ok(inner.state);
            }
            if !inner.state.can_verify() {
                return Err(self.reject(VerificationError::CodeNotSent));
            }

            if let Err(err) = self.otp.verify_otp(&target.user_id, &code).await {
                warn!(error = %err, user_id = %target.user_id, "verify otp failed");
                let message = err
                    .field_message("otp")
                    .unwrap_or(INVALID_OTP_MESSAGE)
                    .to_string();
                return Err(self.reject(VerificationError::Rejected(message)));
            }

            inner.state = inner.state.transition(VerificationEvent::CodeAccepted);
            if let Err(err) = self.cooldown.stop(&target.user_id).await {
                warn!(error = %err, "failed to stop resend cooldown");
            }
            inner.cooldown = None;

            if self.scope == VerificationScope::OwnAccount {
                let kind = target.contact.kind;
                let user_id = target.user_id.clone();
                self.app_state
                    .update(|state| {
                        state.session.mark_contact_verified(kind);
                        state.signup.mark_verified(&user_id);
                    })
                    .await?;
            }

            info!(user_id = %target.user_id, "contact verified");
            self.notifier.notify(Notification::success(format!(
                "{} verified successfully!",
                target.contact.kind.label()
            )));
            Ok(inner.state)
        }
        .instrument(span)
        .await
    }

    fn reject(&self, err: VerificationError) -> VerificationError {
        self.notifier.notify(Notification::error(err.to_string()));
        err
    }
}

fn remaining(inner: &Inner) -> u64 {
    inner.cooldown.as_ref().map(|rx| *rx.borrow()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{memory_state, ManualCooldown, RecordingNotifier};
    use oh_core::api::ApiError;
    use oh_core::contact::{Contact, ContactType};
    use oh_core::ids::UserId;
    use oh_core::ports::mocks::MockOtp;
    use oh_core::registration::RegistrationReceipt;

    fn target() -> VerificationTarget {
        VerificationTarget {
            user_id: UserId::from(42),
            contact: Contact::new("01700000000", ContactType::Phone),
        }
    }

    struct Harness {
        verification: ContactVerification,
        notifier: Arc<RecordingNotifier>,
        cooldown: Arc<ManualCooldown>,
        app_state: Arc<AppStateContext>,
    }

    async fn harness(otp: MockOtp, scope: VerificationScope) -> Harness {
        let notifier = RecordingNotifier::arc();
        let cooldown = ManualCooldown::arc();
        let app_state = memory_state();
        let verification = ContactVerification::new(
            Arc::new(otp),
            cooldown.clone(),
            notifier.clone(),
            app_state.clone(),
            60,
            scope,
        );
        verification.set_target(Some(target())).await;
        Harness {
            verification,
            notifier,
            cooldown,
            app_state,
        }
    }

    #[tokio::test]
    async fn send_failure_reports_detail_and_stays_unsent() {
        let mut otp = MockOtp::new();
        otp.expect_send_otp()
            .returning(|_| Err(ApiError::from_response(400, r#"{"detail":"User not found"}"#)));
        let h = harness(otp, VerificationScope::ThirdParty).await;

        let err = h.verification.send_code().await.unwrap_err();

        assert!(matches!(err, VerificationError::SendFailed(_)));
        assert_eq!(h.notifier.errors(), vec!["Failed to send OTP: User not found"]);
        assert_eq!(h.verification.state().await, VerificationState::Unsent);
    }

    #[tokio::test]
    async fn send_without_target_makes_no_call() {
        let otp = MockOtp::new();
        let h = harness(otp, VerificationScope::ThirdParty).await;
        h.verification.set_target(None).await;

        let err = h.verification.send_code().await.unwrap_err();

        assert_eq!(err.to_string(), "User ID not found. Cannot send OTP.");
    }

    #[tokio::test]
    async fn resend_is_gated_by_cooldown() {
        let mut otp = MockOtp::new();
        otp.expect_send_otp()
            .times(2)
            .returning(|_| Ok("OTP sent".into()));
        let h = harness(otp, VerificationScope::ThirdParty).await;

        h.verification.send_code().await.unwrap();
        assert_eq!(h.notifier.messages(), vec!["OTP sent to 01700000000"]);
        assert!(!h.verification.can_resend().await);
        assert_eq!(h.verification.cooldown_remaining().await, 60);

        let err = h.verification.send_code().await.unwrap_err();
        assert!(matches!(
            err,
            VerificationError::CooldownActive { remaining_secs: 60 }
        ));

        h.cooldown.set(&UserId::from(42), 1);
        assert!(!h.verification.can_resend().await);
        h.cooldown.set(&UserId::from(42), 0);
        assert!(h.verification.can_resend().await);

        h.verification.send_code().await.unwrap();
    }

    #[tokio::test]
    async fn malformed_code_never_reaches_backend() {
        let mut otp = MockOtp::new();
        otp.expect_send_otp().returning(|_| Ok(String::new()));
        let h = harness(otp, VerificationScope::ThirdParty).await;
        h.verification.send_code().await.unwrap();

        for input in ["12345", "1234567", "12a456"] {
            let err = h.verification.verify_code(input).await.unwrap_err();
            assert_eq!(err.to_string(), "Please enter a valid 6-digit OTP.");
        }
        assert_eq!(h.verification.state().await, VerificationState::Sent);
    }

    #[tokio::test]
    async fn verified_own_account_updates_session_and_draft() {
        let mut otp = MockOtp::new();
        otp.expect_send_otp().returning(|_| Ok(String::new()));
        otp.expect_verify_otp()
            .withf(|id, code| id == &UserId::from(42) && code.as_str() == "123456")
            .returning(|_, _| Ok("OTP verified successfully".into()));
        let h = harness(otp, VerificationScope::OwnAccount).await;
        h.app_state
            .update(|s| {
                s.signup.record_signup(&RegistrationReceipt {
                    application_id: UserId::from(42),
                    first_name: "Rahim".into(),
                    last_name: "Mia".into(),
                    contact: target().contact,
                })
            })
            .await
            .unwrap();
        h.verification.send_code().await.unwrap();

        let state = h.verification.verify_code("123456").await.unwrap();

        assert!(state.is_verified());
        assert_eq!(
            h.notifier.last().unwrap().message,
            "Phone Number verified successfully!"
        );
        let snapshot = h.app_state.snapshot().await;
        assert!(snapshot.session.phone_verified);
        assert!(snapshot.signup.is_verified());
        assert!(!h.verification.can_resend().await);
    }

    #[tokio::test]
    async fn third_party_verification_leaves_session_alone() {
        let mut otp = MockOtp::new();
        otp.expect_send_otp().returning(|_| Ok(String::new()));
        otp.expect_verify_otp().returning(|_, _| Ok(String::new()));
        let h = harness(otp, VerificationScope::ThirdParty).await;
        h.verification.send_code().await.unwrap();

        h.verification.verify_code("123456").await.unwrap();

        assert!(!h.app_state.session().await.phone_verified);
    }

    #[tokio::test]
    async fn rejected_code_prefers_otp_field_error() {
        let mut otp = MockOtp::new();
        otp.expect_send_otp().returning(|_| Ok(String::new()));
        otp.expect_verify_otp()
            .withf(|_, code| code.as_str() == "111111")
            .returning(|_, _| Err(ApiError::from_response(400, r#"{"otp":["OTP expired."]}"#)));
        otp.expect_verify_otp()
            .withf(|_, code| code.as_str() == "222222")
            .returning(|_, _| Err(ApiError::from_response(500, "")));
        let h = harness(otp, VerificationScope::ThirdParty).await;
        h.verification.send_code().await.unwrap();

        let first = h.verification.verify_code("111111").await.unwrap_err();
        let second = h.verification.verify_code("222222").await.unwrap_err();

        assert_eq!(first.to_string(), "OTP expired.");
        assert_eq!(second.to_string(), INVALID_OTP_MESSAGE);
        assert_eq!(h.verification.state().await, VerificationState::Sent);
    }
}
