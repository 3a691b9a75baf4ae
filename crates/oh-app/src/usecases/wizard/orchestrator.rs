//! Wizard orchestrator.
//!
//! Drives the pure wizard state machine, runs the side effects it requests and
//! feeds their results back in as events.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, info_span, warn, Instrument};

use oh_core::payment::{PaymentMethod, PaymentRequest};
use oh_core::ports::{Notification, NotificationPort};
use oh_core::registration::RegistrationReceipt;
use oh_core::validation::ValidationError;
use oh_core::verification::VerificationState;
use oh_core::wizard::{
    WizardAction, WizardError, WizardEvent, WizardState, WizardStateMachine, WizardStep,
};

use super::context::WizardContext;
use super::flow::RegistrationFlow;
use crate::usecases::payment::CollectPayment;
use crate::usecases::verification::{ContactVerification, VerificationError};

#[derive(Debug, thiserror::Error)]
pub enum WizardFlowError {
    /// The step stayed where it was; the error is also recorded on the state.
    #[error(transparent)]
    StepFailed(WizardError),
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error("wizard side effect failed: {0}")]
    SideEffect(#[from] anyhow::Error),
}

pub struct WizardOrchestrator<F: RegistrationFlow> {
    flow: F,
    context: Arc<WizardContext>,
    draft: Mutex<F::Draft>,
    receipt: Mutex<Option<RegistrationReceipt>>,
    payment_method: Mutex<Option<PaymentMethod>>,
    verification: Arc<ContactVerification>,
    payment: Arc<CollectPayment>,
    notifier: Arc<dyn NotificationPort>,
}

impl<F: RegistrationFlow> WizardOrchestrator<F> {
    pub async fn new(
        flow: F,
        verification: Arc<ContactVerification>,
        payment: Arc<CollectPayment>,
        notifier: Arc<dyn NotificationPort>,
    ) -> Self {
        let draft = flow.initial_draft().await;
        let context = WizardContext::new(flow.kind());
        let mut receipt = None;

        if let Some(point) = flow.resume_point(&draft).await {
            if let Some(state) = WizardState::resumed(flow.kind(), point.contact_verified) {
                info!(
                    flow = %flow.kind(),
                    application_id = %point.receipt.application_id,
                    contact_verified = point.contact_verified,
                    "resuming accepted registration at verification"
                );
                let target = flow.verification_target(&draft, &point.receipt);
                verification.resume(target, point.contact_verified).await;
                context.set_state(state).await;
                receipt = Some(point.receipt);
            }
        }

        Self {
            context: context.arc(),
            flow,
            draft: Mutex::new(draft),
            receipt: Mutex::new(receipt),
            payment_method: Mutex::new(None),
            verification,
            payment,
            notifier,
        }
    }

    pub async fn state(&self) -> WizardState {
        self.context.get_state().await
    }

    pub async fn draft(&self) -> F::Draft {
        self.draft.lock().await.clone()
    }

    pub async fn receipt(&self) -> Option<RegistrationReceipt> {
        self.receipt.lock().await.clone()
    }

    pub async fn verification_state(&self) -> VerificationState {
        self.verification.state().await
    }

    pub fn verification(&self) -> &Arc<ContactVerification> {
        &self.verification
    }

    /// True on the verification step once the contact is verified.
    pub async fn can_continue_to_payment(&self) -> bool {
        let state = self.state().await;
        state.step == WizardStep::Verification && state.contact_verified
    }

    /// Edits the draft in place. Earlier answers stay untouched.
    pub async fn update_draft<R>(
        &self,
        edit: impl FnOnce(&mut F::Draft) -> R,
    ) -> Result<R, WizardFlowError> {
        let mut draft = self.draft.lock().await;
        let result = edit(&mut draft);
        self.flow.on_draft_changed(&draft).await?;
        Ok(result)
    }

    pub async fn select_payment_method(&self, method: PaymentMethod) {
        *self.payment_method.lock().await = Some(method);
    }

    /// Validates the current step and submits it.
    ///
    /// A validation failure is recorded on the state and notified without any
    /// port being called. Returns `StepFailed` whenever the step did not advance
    /// because of an error.
    pub async fn submit_step(&self) -> Result<WizardState, WizardFlowError> {
        let current = self.state().await;

        if let Err(validation) = self.precheck(current.step).await {
            warn!(step = ?current.step, error = %validation, "step validation failed");
            self.notifier
                .notify(Notification::error(validation.to_string()));
            let error = WizardError::Validation(validation);
            self.dispatch(WizardEvent::StepFailed {
                error: error.clone(),
            })
            .await?;
            return Err(WizardFlowError::StepFailed(error));
        }

        let next = self.dispatch(WizardEvent::Submit).await?;
        match (&next.error, next.step == current.step) {
            (Some(error), true) => {
                if *error == WizardError::ContactNotVerified {
                    self.notifier.notify(Notification::error(error.to_string()));
                }
                Err(WizardFlowError::StepFailed(error.clone()))
            }
            _ => Ok(next),
        }
    }

    pub async fn send_code(&self) -> Result<VerificationState, WizardFlowError> {
        Ok(self.verification.send_code().await?)
    }

    /// Checks the code and, once verified, tells the state machine.
    pub async fn verify_code(&self, code: &str) -> Result<WizardState, WizardFlowError> {
        let state = self.verification.verify_code(code).await?;
        if !state.is_verified() {
            return Ok(self.state().await);
        }
        if let Some(message) = self.flow.messages().verified {
            self.notifier.notify(Notification::success(message));
        }
        self.dispatch(WizardEvent::ContactVerified).await
    }

    pub async fn go_back(&self, to: WizardStep) -> Result<WizardState, WizardFlowError> {
        self.dispatch(WizardEvent::GoBack { to }).await
    }

    pub async fn register_another(&self) -> Result<WizardState, WizardFlowError> {
        self.dispatch(WizardEvent::RegisterAnother).await
    }

    async fn precheck(&self, step: WizardStep) -> Result<(), ValidationError> {
        match step {
            WizardStep::Payment => {
                if self.payment_method.lock().await.is_none() {
                    return Err(ValidationError::MissingPaymentMethod);
                }
                Ok(())
            }
            _ => {
                let draft = self.draft.lock().await;
                self.flow.validate(step, &draft)
            }
        }
    }

    async fn dispatch(&self, event: WizardEvent) -> Result<WizardState, WizardFlowError> {
        let _dispatch_guard = self.context.acquire_dispatch_lock().await;

        let flow = self.flow.kind();
        let span = info_span!("usecase.wizard_orchestrator.dispatch", %flow, event = ?event);
        async {
            let mut current = self.context.get_state().await;
            let mut pending_events = vec![event];

            while let Some(event) = pending_events.pop() {
                let from = current.step;
                let event_name = format!("{:?}", event);
                let (next, actions) = WizardStateMachine::transition(current, event);
                info!(from = ?from, to = ?next.step, event = %event_name, "wizard state transition");
                let follow_up_events = self.execute_actions(actions).await?;
                self.context.set_state(next.clone()).await;
                current = next;
                pending_events.extend(follow_up_events);
            }

            Ok(current)
        }
        .instrument(span)
        .await
    }

    async fn execute_actions(
        &self,
        actions: Vec<WizardAction>,
    ) -> Result<Vec<WizardEvent>, WizardFlowError> {
        let mut follow_up_events = Vec::new();
        for action in actions {
            debug!(?action, "wizard executing action");
            match action {
                WizardAction::SubmitRegistration => {
                    follow_up_events.push(self.submit_registration().await?);
                }
                WizardAction::CollectPayment => {
                    follow_up_events.push(self.collect_payment().await?);
                }
                WizardAction::ResetDraft => {
                    self.reset().await?;
                }
            }
        }
        Ok(follow_up_events)
    }

    async fn submit_registration(&self) -> Result<WizardEvent, WizardFlowError> {
        let mut draft = self.draft.lock().await;
        let receipt = match self.flow.submit(&draft).await {
            Ok(receipt) => receipt,
            Err(error) => {
                self.notifier.notify(Notification::error(error.to_string()));
                return Ok(WizardEvent::StepFailed { error });
            }
        };

        info!(application_id = %receipt.application_id, "registration accepted");
        self.flow.on_registered(&mut draft, &receipt).await?;
        let target = self.flow.verification_target(&draft, &receipt);
        self.verification.set_target(Some(target)).await;
        *self.receipt.lock().await = Some(receipt);

        self.notifier
            .notify(Notification::success(self.flow.messages().submitted));
        Ok(WizardEvent::StepSucceeded)
    }

    async fn collect_payment(&self) -> Result<WizardEvent, WizardFlowError> {
        let Some(method) = *self.payment_method.lock().await else {
            return Ok(WizardEvent::StepFailed {
                error: ValidationError::MissingPaymentMethod.into(),
            });
        };
        let payee = {
            let draft = self.draft.lock().await;
            let receipt = self.receipt.lock().await;
            self.flow.payee(&draft, receipt.as_ref())
        };
        let request = PaymentRequest {
            amount: self.flow.kind().fee(),
            payee_name: payee.name,
            payee_id: payee.id,
            service_code: payee.service_code,
            method,
        };

        match self.payment.execute(&request).await {
            Ok(_) => {
                self.flow.on_paid().await?;
                self.notifier
                    .notify(Notification::success(self.flow.messages().completed));
                Ok(WizardEvent::StepSucceeded)
            }
            Err(err) => Ok(WizardEvent::StepFailed {
                error: WizardError::PaymentFailed {
                    reason: err.to_string(),
                },
            }),
        }
    }

    async fn reset(&self) -> Result<(), WizardFlowError> {
        let fresh = self.flow.initial_draft().await;
        {
            let mut draft = self.draft.lock().await;
            *draft = fresh;
            self.flow.on_draft_changed(&draft).await?;
        }
        *self.receipt.lock().await = None;
        *self.payment_method.lock().await = None;
        self.verification.set_target(None).await;
        debug!("wizard draft reset");
        Ok(())
    }
}
