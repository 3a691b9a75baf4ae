use std::sync::Arc;

use async_trait::async_trait;

use oh_core::ports::RegistrationPort;
use oh_core::registration::{RegistrationReceipt, SubAccountDraft};
use oh_core::validation::ValidationError;
use oh_core::verification::VerificationTarget;
use oh_core::wizard::{FlowKind, WizardError, WizardStep};

use crate::usecases::wizard::flow::{request_failed, FlowMessages, Payee, RegistrationFlow};

const MESSAGES: FlowMessages = FlowMessages {
    submitted: "Sub-account data submitted! Please verify OTP.",
    submit_fallback: "Sub-account creation failed.",
    verified: Some("OTP verified successfully! Proceeding to payment."),
    completed: "Payment successful! Sub-account created.",
};

/// Dependent account created under an existing public user. The code is
/// exchanged for the parent account and goes to the parent's contact.
pub struct SubAccountFlow {
    registration: Arc<dyn RegistrationPort>,
}

impl SubAccountFlow {
    pub fn new(registration: Arc<dyn RegistrationPort>) -> Self {
        Self { registration }
    }
}

#[async_trait]
impl RegistrationFlow for SubAccountFlow {
    type Draft = SubAccountDraft;

    fn kind(&self) -> FlowKind {
        FlowKind::SubAccount
    }

    fn messages(&self) -> FlowMessages {
        MESSAGES
    }

    async fn initial_draft(&self) -> SubAccountDraft {
        SubAccountDraft::default()
    }

    fn validate(&self, step: WizardStep, draft: &SubAccountDraft) -> Result<(), ValidationError> {
        match step {
            WizardStep::SelectParent | WizardStep::ConfirmParent => {
                draft.validate_parent().map(|_| ())
            }
            WizardStep::Form => draft.validate().map(|_| ()),
            _ => Ok(()),
        }
    }

    async fn submit(&self, draft: &SubAccountDraft) -> Result<RegistrationReceipt, WizardError> {
        draft.validate()?;
        let parent = draft.validate_parent()?;
        self.registration
            .register_sub_account(draft, parent)
            .await
            .map_err(|err| request_failed(err, MESSAGES.submit_fallback))
    }

    fn payee(&self, draft: &SubAccountDraft, receipt: Option<&RegistrationReceipt>) -> Payee {
        Payee {
            name: draft.name_en(),
            id: receipt.map(|r| r.application_id.clone()),
            service_code: None,
        }
    }

    fn verification_target(
        &self,
        draft: &SubAccountDraft,
        receipt: &RegistrationReceipt,
    ) -> VerificationTarget {
        match draft.parent.as_ref() {
            Some(parent) => VerificationTarget {
                user_id: parent.id.clone(),
                contact: parent.contact().unwrap_or_else(|| receipt.contact.clone()),
            },
            None => VerificationTarget {
                user_id: receipt.application_id.clone(),
                contact: receipt.contact.clone(),
            },
        }
    }
}
