//! Registration wizards: one orchestrator driving three flows.

mod context;
mod flow;
pub mod flows;
mod orchestrator;

pub use context::WizardContext;
pub use flow::{FlowMessages, Payee, RegistrationFlow, ResumePoint};
pub use flows::{CollectorSignupFlow, PublicRegistrationFlow, SubAccountFlow};
pub use orchestrator::{WizardFlowError, WizardOrchestrator};

pub type PublicRegistrationWizard = WizardOrchestrator<PublicRegistrationFlow>;
pub type SubAccountWizard = WizardOrchestrator<SubAccountFlow>;
pub type CollectorSignupWizard = WizardOrchestrator<CollectorSignupFlow>;
