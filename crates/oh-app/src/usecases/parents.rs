use std::sync::Arc;

use tracing::{debug, info_span, Instrument};

use oh_core::api::ApiError;
use oh_core::ports::RegistrationPort;
use oh_core::registration::ParentAccount;

pub const MIN_PARENT_SEARCH_LEN: usize = 3;

/// Finds public users a sub-account can be attached to.
pub struct SearchParentAccounts {
    registration: Arc<dyn RegistrationPort>,
}

impl SearchParentAccounts {
    pub fn new(registration: Arc<dyn RegistrationPort>) -> Self {
        Self { registration }
    }

    /// Terms shorter than three characters return nothing without a request.
    pub async fn execute(&self, term: &str) -> Result<Vec<ParentAccount>, ApiError> {
        let term = term.trim();
        let span = info_span!("usecase.search_parent_accounts.execute", term);

        async {
            if term.chars().count() < MIN_PARENT_SEARCH_LEN {
                return Ok(Vec::new());
            }
            let parents = self.registration.search_parent_accounts(term).await?;
            debug!(count = parents.len(), "parent accounts found");
            Ok(parents)
        }
        .instrument(span)
        .await
    }
}
