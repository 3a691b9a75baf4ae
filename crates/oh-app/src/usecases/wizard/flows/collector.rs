use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use oh_core::ports::RegistrationPort;
use oh_core::registration::RegistrationReceipt;
use oh_core::session::SignupDraft;
use oh_core::validation::ValidationError;
use oh_core::wizard::{FlowKind, WizardError, WizardStep};

use crate::usecases::session::AppStateContext;
use crate::usecases::verification::VerificationScope;
use crate::usecases::wizard::flow::{
    request_failed, FlowMessages, Payee, RegistrationFlow, ResumePoint,
};

const MESSAGES: FlowMessages = FlowMessages {
    submitted: "Registration successful! Redirecting to verify...",
    submit_fallback: "An unknown error occurred.",
    verified: None,
    completed: "Payment successful! Your application is now under review.",
};

/// Data-collector self-signup. The draft lives in the persisted application
/// state so an interrupted signup can be resumed.
///
/// Once the account exists, a new wizard starts on the verification step for
/// the stored application id and never registers again. A logged-in collector
/// without a verified contact resumes the same way from the session.
pub struct CollectorSignupFlow {
    registration: Arc<dyn RegistrationPort>,
    app_state: Arc<AppStateContext>,
}

impl CollectorSignupFlow {
    pub fn new(registration: Arc<dyn RegistrationPort>, app_state: Arc<AppStateContext>) -> Self {
        Self {
            registration,
            app_state,
        }
    }
}

#[async_trait]
impl RegistrationFlow for CollectorSignupFlow {
    type Draft = SignupDraft;

    fn kind(&self) -> FlowKind {
        FlowKind::CollectorSignup
    }

    fn scope(&self) -> VerificationScope {
        VerificationScope::OwnAccount
    }

    fn messages(&self) -> FlowMessages {
        MESSAGES
    }

    async fn initial_draft(&self) -> SignupDraft {
        self.app_state.snapshot().await.signup
    }

    async fn resume_point(&self, draft: &SignupDraft) -> Option<ResumePoint> {
        if let Some(receipt) = draft.pending_receipt() {
            return Some(ResumePoint {
                receipt,
                contact_verified: draft.is_verified(),
            });
        }
        let receipt = self.app_state.snapshot().await.session.pending_verification()?;
        Some(ResumePoint {
            receipt,
            contact_verified: false,
        })
    }

    fn validate(&self, step: WizardStep, draft: &SignupDraft) -> Result<(), ValidationError> {
        match step {
            WizardStep::Form => draft.validate().map(|_| ()),
            _ => Ok(()),
        }
    }

    async fn submit(&self, draft: &SignupDraft) -> Result<RegistrationReceipt, WizardError> {
        let contact = draft.validate()?;
        self.registration
            .register_collector(draft, &contact)
            .await
            .map_err(|err| request_failed(err, MESSAGES.submit_fallback))
    }

    fn payee(&self, draft: &SignupDraft, receipt: Option<&RegistrationReceipt>) -> Payee {
        let name = match receipt {
            Some(r) => format!("{} {}", r.first_name, r.last_name),
            None => format!("{} {}", draft.first_name, draft.last_name),
        };
        Payee {
            name: name.trim().to_string(),
            id: receipt.map(|r| r.application_id.clone()),
            service_code: None,
        }
    }

    async fn on_draft_changed(&self, draft: &SignupDraft) -> anyhow::Result<()> {
        let draft = draft.clone();
        self.app_state.update(|state| state.signup = draft).await
    }

    async fn on_registered(
        &self,
        draft: &mut SignupDraft,
        receipt: &RegistrationReceipt,
    ) -> anyhow::Result<()> {
        draft.record_signup(receipt);
        let draft = draft.clone();
        let receipt = receipt.clone();
        self.app_state
            .update(|state| {
                state.signup = draft;
                let session = &mut state.session;
                session.first_name = receipt.first_name.clone();
                session.last_name = receipt.last_name.clone();
                session.application_id = Some(receipt.application_id.clone());
                session.contact = Some(receipt.contact.value.clone());
                session.contact_type = Some(receipt.contact.kind);
            })
            .await?;
        debug!(application_id = %receipt.application_id, "collector signup stored");
        Ok(())
    }

    async fn on_paid(&self) -> anyhow::Result<()> {
        self.app_state
            .update(|state| {
                state.session.payment_made = true;
                state.signup.reset();
            })
            .await
    }
}
