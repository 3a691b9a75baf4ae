pub mod address;
pub mod approvals;
pub mod parents;
pub mod payment;
pub mod route_guard;
pub mod session;
pub mod verification;
pub mod wizard;

pub use address::ListAddressOptions;
pub use approvals::{DecideApplication, DecideApplicationError};
pub use parents::SearchParentAccounts;
pub use payment::{CollectPayment, CollectPaymentError};
pub use route_guard::{GuardRoute, RouteWatch};
pub use session::{AppStateContext, FetchCurrentUser, Login, LoginOutcome, Logout};
pub use verification::{ContactVerification, VerificationError, VerificationScope};
pub use wizard::{
    CollectorSignupFlow, CollectorSignupWizard, PublicRegistrationFlow, PublicRegistrationWizard,
    RegistrationFlow, SubAccountFlow, SubAccountWizard, WizardFlowError, WizardOrchestrator,
};
