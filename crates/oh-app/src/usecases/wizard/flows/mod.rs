mod collector;
mod public;
mod sub_account;

pub use collector::CollectorSignupFlow;
pub use public::PublicRegistrationFlow;
pub use sub_account::SubAccountFlow;
