//! Session lifecycle: the shared application state and the auth use cases.

mod context;
mod current_user;
mod login;
mod logout;

pub use context::AppStateContext;
pub use current_user::{FetchCurrentUser, FetchCurrentUserError};
pub use login::{
    Login, LoginError, LoginOutcome, COMPLETE_PAYMENT_NOTICE, LOGIN_FAILED_MESSAGE,
    VERIFY_CONTACT_NOTICE,
};
pub use logout::Logout;
