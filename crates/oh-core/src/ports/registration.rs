use async_trait::async_trait;

use crate::api::ApiError;
use crate::contact::Contact;
use crate::registration::{
    ParentAccount, PublicRegistrationDraft, RegistrationReceipt, SubAccountDraft,
};
use crate::session::SignupDraft;

/// Account creation endpoints (`/accounts/register`) and parent lookup.
///
/// Drafts are passed already validated; `contact` is the classified contact
/// the validation produced.
#[async_trait]
pub trait RegistrationPort: Send + Sync {
    async fn register_collector(
        &self,
        draft: &SignupDraft,
        contact: &Contact,
    ) -> Result<RegistrationReceipt, ApiError>;

    async fn register_public_user(
        &self,
        draft: &PublicRegistrationDraft,
        contact: &Contact,
    ) -> Result<RegistrationReceipt, ApiError>;

    async fn register_sub_account(
        &self,
        draft: &SubAccountDraft,
        parent: &ParentAccount,
    ) -> Result<RegistrationReceipt, ApiError>;

    async fn search_parent_accounts(&self, term: &str) -> Result<Vec<ParentAccount>, ApiError>;
}
