use async_trait::async_trait;
use tracing::warn;

use oh_core::api::ApiError;
use oh_core::ids::{ServiceCode, UserId};
use oh_core::registration::RegistrationReceipt;
use oh_core::validation::ValidationError;
use oh_core::verification::VerificationTarget;
use oh_core::wizard::{FlowKind, WizardError, WizardStep};

use crate::usecases::verification::VerificationScope;

/// Notification texts of one flow.
#[derive(Debug, Clone, Copy)]
pub struct FlowMessages {
    /// Shown when the registration request succeeded.
    pub submitted: &'static str,
    /// Shown when a registration request fails without a usable server message.
    pub submit_fallback: &'static str,
    /// Shown after the contact was verified, on top of the verification notice.
    pub verified: Option<&'static str>,
    /// Shown once the fee is paid.
    pub completed: &'static str,
}

/// Who the fee is collected for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payee {
    pub name: String,
    pub id: Option<UserId>,
    pub service_code: Option<ServiceCode>,
}

/// A registration the backend accepted in an earlier run, picked up again at
/// the verification step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumePoint {
    pub receipt: RegistrationReceipt,
    pub contact_verified: bool,
}

/// The flow-specific half of a registration wizard: the draft it collects,
/// how a step is validated and which endpoint receives the submission.
#[async_trait]
pub trait RegistrationFlow: Send + Sync {
    type Draft: Clone + Send + Sync + 'static;

    fn kind(&self) -> FlowKind;

    fn scope(&self) -> VerificationScope {
        VerificationScope::ThirdParty
    }

    fn messages(&self) -> FlowMessages;

    /// Draft the wizard starts with, and restarts with after "register another".
    async fn initial_draft(&self) -> Self::Draft;

    /// Where a wizard built over `draft` continues instead of the first step.
    async fn resume_point(&self, _draft: &Self::Draft) -> Option<ResumePoint> {
        None
    }

    /// Client-side checks for `step`. A failure must never reach a port.
    fn validate(&self, step: WizardStep, draft: &Self::Draft) -> Result<(), ValidationError>;

    /// Sends the draft to the backend. Errors carry the user-facing message.
    async fn submit(&self, draft: &Self::Draft) -> Result<RegistrationReceipt, WizardError>;

    fn payee(&self, draft: &Self::Draft, receipt: Option<&RegistrationReceipt>) -> Payee;

    /// Account and contact the one-time code is exchanged for.
    fn verification_target(
        &self,
        _draft: &Self::Draft,
        receipt: &RegistrationReceipt,
    ) -> VerificationTarget {
        VerificationTarget {
            user_id: receipt.application_id.clone(),
            contact: receipt.contact.clone(),
        }
    }

    async fn on_draft_changed(&self, _draft: &Self::Draft) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_registered(
        &self,
        _draft: &mut Self::Draft,
        _receipt: &RegistrationReceipt,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_paid(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Turns a failed registration request into the error shown on the form step.
pub(crate) fn request_failed(err: ApiError, fallback: &str) -> WizardError {
    warn!(error = %err, "registration request failed");
    WizardError::Request {
        message: err.user_message(fallback),
    }
}
