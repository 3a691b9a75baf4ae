//! Wizard state machine.
//!
//! Defines a pure state transition function shared by the public-user
//! registration, sub-account and collector signup flows.

use serde::{Deserialize, Serialize};

use crate::payment::Amount;
use crate::validation::ValidationError;

/// Which registration flow a wizard is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    PublicRegistration,
    SubAccount,
    CollectorSignup,
}

/// A screen of a wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WizardStep {
    /// Search for and pick the parent account.
    SelectParent,
    /// Review the picked parent account.
    ConfirmParent,
    /// Fill and submit the registration form.
    Form,
    /// Prove ownership of the contact address.
    Verification,
    /// Pay the registration fee.
    Payment,
    /// Terminal screen showing the created record.
    Success,
}

impl FlowKind {
    pub fn steps(&self) -> &'static [WizardStep] {
        match self {
            FlowKind::PublicRegistration | FlowKind::CollectorSignup => &[
                WizardStep::Form,
                WizardStep::Verification,
                WizardStep::Payment,
                WizardStep::Success,
            ],
            FlowKind::SubAccount => &[
                WizardStep::SelectParent,
                WizardStep::ConfirmParent,
                WizardStep::Form,
                WizardStep::Verification,
                WizardStep::Payment,
                WizardStep::Success,
            ],
        }
    }

    pub fn first_step(&self) -> WizardStep {
        self.steps()[0]
    }

    /// 1-based position of `step` in this flow.
    pub fn position(&self, step: WizardStep) -> Option<usize> {
        self.steps().iter().position(|s| *s == step).map(|i| i + 1)
    }

    pub fn next(&self, step: WizardStep) -> Option<WizardStep> {
        let index = self.position(step)?;
        self.steps().get(index).copied()
    }

    pub fn fee(&self) -> Amount {
        match self {
            FlowKind::PublicRegistration | FlowKind::SubAccount => Amount::taka(500),
            FlowKind::CollectorSignup => Amount::taka(1000),
        }
    }

    /// The sub-account flow moves to payment as soon as the code is accepted;
    /// the other flows wait for an explicit continue.
    pub fn advances_on_verification(&self) -> bool {
        matches!(self, FlowKind::SubAccount)
    }
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FlowKind::PublicRegistration => "public registration",
            FlowKind::SubAccount => "sub-account",
            FlowKind::CollectorSignup => "collector signup",
        };
        f.write_str(name)
    }
}

/// Errors kept on the current step until the next submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{message}")]
    Request { message: String },
    #[error("Please verify your contact before continuing.")]
    ContactNotVerified,
    #[error("{reason}")]
    PaymentFailed { reason: String },
}

/// Wizard state: current step plus the error shown on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub flow: FlowKind,
    pub step: WizardStep,
    pub contact_verified: bool,
    pub error: Option<WizardError>,
}

impl WizardState {
    pub fn new(flow: FlowKind) -> Self {
        Self {
            flow,
            step: flow.first_step(),
            contact_verified: false,
            error: None,
        }
    }

    /// State of a wizard whose registration was already accepted in an
    /// earlier run: parked on the verification step. `None` for flows without
    /// one.
    pub fn resumed(flow: FlowKind, contact_verified: bool) -> Option<Self> {
        flow.position(WizardStep::Verification)?;
        Some(Self {
            flow,
            step: WizardStep::Verification,
            contact_verified,
            error: None,
        })
    }

    /// 1-based step index.
    pub fn position(&self) -> usize {
        self.flow.position(self.step).unwrap_or(1)
    }

    pub fn total_steps(&self) -> usize {
        self.flow.steps().len()
    }

    pub fn is_complete(&self) -> bool {
        self.step == WizardStep::Success
    }

    fn advanced(self) -> Self {
        match self.flow.next(self.step) {
            Some(step) => Self {
                step,
                error: None,
                ..self
            },
            None => self,
        }
    }

    fn with_error(self, error: WizardError) -> Self {
        Self {
            error: Some(error),
            ..self
        }
    }
}

/// Events that drive a wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardEvent {
    /// User submits the current step. Draft validation has already passed.
    Submit,
    /// The network work requested for the current step succeeded.
    StepSucceeded,
    /// The current step failed; stay and show `error`.
    StepFailed { error: WizardError },
    /// The contact verification round trip succeeded.
    ContactVerified,
    /// Jump back to an earlier step without clearing data.
    GoBack { to: WizardStep },
    /// Start over from the success screen.
    RegisterAnother,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardAction {
    SubmitRegistration,
    CollectPayment,
    ResetDraft,
}

pub struct WizardStateMachine;

impl WizardStateMachine {
    pub fn transition(state: WizardState, event: WizardEvent) -> (WizardState, Vec<WizardAction>) {
        match (state.step, event) {
            (WizardStep::Success, WizardEvent::RegisterAnother) => {
                (WizardState::new(state.flow), vec![WizardAction::ResetDraft])
            }
            (WizardStep::Success, _) => (state, Vec::new()),

            (WizardStep::Form, WizardEvent::Submit) => (
                WizardState { error: None, ..state },
                vec![WizardAction::SubmitRegistration],
            ),
            (WizardStep::Payment, WizardEvent::Submit) => (
                WizardState { error: None, ..state },
                vec![WizardAction::CollectPayment],
            ),
            (WizardStep::Verification, WizardEvent::Submit) => {
                if state.contact_verified {
                    (state.advanced(), Vec::new())
                } else {
                    (state.with_error(WizardError::ContactNotVerified), Vec::new())
                }
            }
            (WizardStep::SelectParent | WizardStep::ConfirmParent, WizardEvent::Submit) => {
                (state.advanced(), Vec::new())
            }

            (WizardStep::Form, WizardEvent::StepSucceeded) => (
                WizardState {
                    contact_verified: false,
                    ..state
                }
                .advanced(),
                Vec::new(),
            ),
            (WizardStep::Payment, WizardEvent::StepSucceeded) => (state.advanced(), Vec::new()),

            (_, WizardEvent::StepFailed { error }) => (state.with_error(error), Vec::new()),

            (WizardStep::Verification, WizardEvent::ContactVerified) => {
                let auto_advance = state.flow.advances_on_verification();
                let verified = WizardState {
                    contact_verified: true,
                    error: None,
                    ..state
                };
                if auto_advance {
                    (verified.advanced(), Vec::new())
                } else {
                    (verified, Vec::new())
                }
            }

            (current, WizardEvent::GoBack { to }) => {
                let flow = state.flow;
                match (flow.position(current), flow.position(to)) {
                    (Some(from), Some(target)) if target < from => (
                        WizardState {
                            step: to,
                            error: None,
                            ..state
                        },
                        Vec::new(),
                    ),
                    _ => (state, Vec::new()),
                }
            }

            (_, _) => (state, Vec::new()),
        }
    }
}
