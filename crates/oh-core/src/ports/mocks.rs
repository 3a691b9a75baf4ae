//! `mockall` doubles for the ports, shared with dependent crates through the
//! `mocks` feature.

use async_trait::async_trait;
use mockall::mock;
use tokio::sync::watch;

use crate::address::{AddressId, AddressLevel, AddressOption};
use crate::api::ApiError;
use crate::contact::Contact;
use crate::ids::UserId;
use crate::payment::{PaymentOutcome, PaymentRequest};
use crate::ports::{
    AddressLookupPort, AppStateStorePort, AuthPort, CooldownTimerPort, LoginCredentials,
    OtpPort, PaymentGatewayPort, RegistrationPort,
};
use crate::registration::{
    ParentAccount, PublicRegistrationDraft, RegistrationReceipt, SubAccountDraft,
};
use crate::session::{AppState, LoginProfile, SignupDraft};
use crate::user::{ApplicationDecision, CurrentUser, PendingApplication};
use crate::verification::{OtpCode, VerificationTarget};

mock! {
    pub Auth {}

    #[async_trait]
    impl AuthPort for Auth {
        async fn login(&self, credentials: &LoginCredentials) -> Result<LoginProfile, ApiError>;
        async fn logout(&self) -> Result<String, ApiError>;
        async fn current_user(&self) -> Result<CurrentUser, ApiError>;
        async fn pending_applications(&self) -> Result<Vec<PendingApplication>, ApiError>;
        async fn decide_application(
            &self,
            id: &UserId,
            decision: &ApplicationDecision,
        ) -> Result<String, ApiError>;
    }
}

mock! {
    pub Registration {}

    #[async_trait]
    impl RegistrationPort for Registration {
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
}

mock! {
    pub Otp {}

    #[async_trait]
    impl OtpPort for Otp {
        async fn send_otp(&self, target: &VerificationTarget) -> Result<String, ApiError>;
        async fn verify_otp(&self, user_id: &UserId, code: &OtpCode) -> Result<String, ApiError>;
    }
}

mock! {
    pub AddressLookup {}

    #[async_trait]
    impl AddressLookupPort for AddressLookup {
        async fn list(
            &self,
            level: AddressLevel,
            parent: Option<(AddressLevel, AddressId)>,
        ) -> Result<Vec<AddressOption>, ApiError>;
    }
}

mock! {
    pub PaymentGateway {}

    #[async_trait]
    impl PaymentGatewayPort for PaymentGateway {
        async fn pay(&self, request: &PaymentRequest) -> anyhow::Result<PaymentOutcome>;
    }
}

mock! {
    pub StateStore {}

    #[async_trait]
    impl AppStateStorePort for StateStore {
        async fn load(&self) -> anyhow::Result<AppState>;
        async fn save(&self, state: &AppState) -> anyhow::Result<()>;
        async fn clear(&self) -> anyhow::Result<()>;
    }
}

mock! {
    pub CooldownTimer {}

    #[async_trait]
    impl CooldownTimerPort for CooldownTimer {
        async fn start(&self, key: &UserId, secs: u64) -> anyhow::Result<watch::Receiver<u64>>;
        async fn stop(&self, key: &UserId) -> anyhow::Result<()>;
    }
}
