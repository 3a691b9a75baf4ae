//! Registration wizard domain.

mod state_machine;

pub use state_machine::{
    FlowKind, WizardAction, WizardError, WizardEvent, WizardState, WizardStateMachine, WizardStep,
};
