use std::sync::Arc;

use async_trait::async_trait;

use oh_core::ports::{ClockPort, RegistrationPort};
use oh_core::ids::ServiceCode;
use oh_core::registration::{PublicRegistrationDraft, RegistrationReceipt};
use oh_core::validation::ValidationError;
use oh_core::wizard::{FlowKind, WizardError, WizardStep};

use crate::usecases::wizard::flow::{request_failed, FlowMessages, Payee, RegistrationFlow};

const MESSAGES: FlowMessages = FlowMessages {
    submitted: "Registration data saved successfully!",
    submit_fallback: "Registration failed. Please try again.",
    verified: None,
    completed: "Payment successful! Digital card will be issued.",
};

/// Public-user registration performed by a collector on someone's behalf.
pub struct PublicRegistrationFlow {
    registration: Arc<dyn RegistrationPort>,
    clock: Arc<dyn ClockPort>,
}

impl PublicRegistrationFlow {
    pub fn new(registration: Arc<dyn RegistrationPort>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            registration,
            clock,
        }
    }
}

#[async_trait]
impl RegistrationFlow for PublicRegistrationFlow {
    type Draft = PublicRegistrationDraft;

    fn kind(&self) -> FlowKind {
        FlowKind::PublicRegistration
    }

    fn messages(&self) -> FlowMessages {
        MESSAGES
    }

    async fn initial_draft(&self) -> PublicRegistrationDraft {
        PublicRegistrationDraft::new(ServiceCode::generate(self.clock.now_ms()))
    }

    fn validate(
        &self,
        step: WizardStep,
        draft: &PublicRegistrationDraft,
    ) -> Result<(), ValidationError> {
        match step {
            WizardStep::Form => draft.validate().map(|_| ()),
            _ => Ok(()),
        }
    }

    async fn submit(
        &self,
        draft: &PublicRegistrationDraft,
    ) -> Result<RegistrationReceipt, WizardError> {
        let contact = draft.validate()?;
        self.registration
            .register_public_user(draft, &contact)
            .await
            .map_err(|err| request_failed(err, MESSAGES.submit_fallback))
    }

    fn payee(
        &self,
        draft: &PublicRegistrationDraft,
        receipt: Option<&RegistrationReceipt>,
    ) -> Payee {
        Payee {
            name: draft.full_name(),
            id: receipt.map(|r| r.application_id.clone()),
            service_code: Some(draft.service_code.clone()),
        }
    }
}
