//! # Use Cases Accessor
//!
//! [`AppRuntime`] owns the wired [`AppDeps`] and the shared application state;
//! [`UseCases`] builds each use case from them on demand.
//!
//! Commands call `runtime.usecases().xxx()` and never touch a port directly.

use std::sync::Arc;

use oh_app::usecases::{
    AppStateContext, CollectPayment, CollectorSignupFlow, CollectorSignupWizard,
    ContactVerification, DecideApplication, FetchCurrentUser, GuardRoute, ListAddressOptions,
    Login, Logout, PublicRegistrationFlow, PublicRegistrationWizard, SearchParentAccounts,
    SubAccountFlow, SubAccountWizard, VerificationScope, WizardOrchestrator,
};
use oh_app::AppDeps;

use super::wiring::SessionCookies;

/// Application runtime with dependencies.
pub struct AppRuntime {
    pub deps: AppDeps,
    app_state: Arc<AppStateContext>,
    cookies: SessionCookies,
    resend_cooldown_secs: u64,
}

impl AppRuntime {
    pub fn new(deps: AppDeps, cookies: SessionCookies, resend_cooldown_secs: u64) -> Self {
        let app_state = AppStateContext::new(deps.state_store.clone()).arc();
        Self {
            deps,
            app_state,
            cookies,
            resend_cooldown_secs,
        }
    }

    pub fn app_state(&self) -> &Arc<AppStateContext> {
        &self.app_state
    }

    pub fn cookies(&self) -> &SessionCookies {
        &self.cookies
    }

    pub fn usecases(&self) -> UseCases<'_> {
        UseCases::new(self)
    }
}

/// Use cases accessor for [`AppRuntime`].
pub struct UseCases<'a> {
    runtime: &'a AppRuntime,
}

impl<'a> UseCases<'a> {
    pub fn new(runtime: &'a AppRuntime) -> Self {
        Self { runtime }
    }

    fn deps(&self) -> &AppDeps {
        &self.runtime.deps
    }

    pub fn login(&self) -> Login {
        Login::new(
            self.deps().auth.clone(),
            self.runtime.app_state.clone(),
            self.deps().notifier.clone(),
        )
    }

    pub fn logout(&self) -> Logout {
        Logout::new(
            self.deps().auth.clone(),
            self.runtime.app_state.clone(),
            self.deps().notifier.clone(),
        )
    }

    pub fn fetch_current_user(&self) -> FetchCurrentUser {
        FetchCurrentUser::new(self.deps().auth.clone(), self.runtime.app_state.clone())
    }

    pub fn guard_route(&self) -> GuardRoute {
        GuardRoute::new(self.runtime.app_state.clone())
    }

    pub fn list_address_options(&self) -> ListAddressOptions {
        ListAddressOptions::new(self.deps().address.clone())
    }

    pub fn search_parent_accounts(&self) -> SearchParentAccounts {
        SearchParentAccounts::new(self.deps().registration.clone())
    }

    pub fn decide_application(&self) -> DecideApplication {
        DecideApplication::new(self.deps().auth.clone(), self.deps().notifier.clone())
    }

    pub fn collect_payment(&self) -> CollectPayment {
        CollectPayment::new(self.deps().payment.clone(), self.deps().notifier.clone())
    }

    pub fn contact_verification(&self, scope: VerificationScope) -> ContactVerification {
        ContactVerification::new(
            self.deps().otp.clone(),
            self.deps().cooldown.clone(),
            self.deps().notifier.clone(),
            self.runtime.app_state.clone(),
            self.runtime.resend_cooldown_secs,
            scope,
        )
    }

    /// Operator registering a member of the public.
    pub async fn public_registration_wizard(&self) -> PublicRegistrationWizard {
        let flow = PublicRegistrationFlow::new(
            self.deps().registration.clone(),
            self.deps().clock.clone(),
        );
        self.wizard(flow, VerificationScope::ThirdParty).await
    }

    /// The code goes to the parent's contact, not the operator's.
    pub async fn sub_account_wizard(&self) -> SubAccountWizard {
        let flow = SubAccountFlow::new(self.deps().registration.clone());
        self.wizard(flow, VerificationScope::ThirdParty).await
    }

    /// Collector signing up for themselves; verification updates the session.
    pub async fn collector_signup_wizard(&self) -> CollectorSignupWizard {
        let flow = CollectorSignupFlow::new(
            self.deps().registration.clone(),
            self.runtime.app_state.clone(),
        );
        self.wizard(flow, VerificationScope::OwnAccount).await
    }

    async fn wizard<F>(&self, flow: F, scope: VerificationScope) -> WizardOrchestrator<F>
    where
        F: oh_app::usecases::RegistrationFlow,
    {
        WizardOrchestrator::new(
            flow,
            Arc::new(self.contact_verification(scope)),
            Arc::new(self.collect_payment()),
            self.deps().notifier.clone(),
        )
        .await
    }
}
