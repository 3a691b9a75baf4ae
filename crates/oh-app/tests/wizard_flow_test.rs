use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use oh_app::usecases::verification::{ContactVerification, VerificationScope};
use oh_app::usecases::wizard::{
    CollectorSignupFlow, PublicRegistrationFlow, RegistrationFlow, SubAccountFlow,
    WizardFlowError, WizardOrchestrator,
};
use oh_app::usecases::{AppStateContext, CollectPayment};
use oh_core::api::ApiError;
use oh_core::contact::{Contact, ContactType};
use oh_core::ids::{PaymentReference, UserId};
use oh_core::payment::{PaymentMethod, PaymentOutcome, PaymentRequest};
use oh_core::ports::{
    AppStateStorePort, ClockPort, Notification, NotificationLevel, NotificationPort, OtpPort,
    PaymentGatewayPort, RegistrationPort,
};
use oh_core::registration::{
    BloodGroup, Gender, ParentAccount, PublicRegistrationDraft, RegistrationReceipt,
    Relationship, SubAccountDraft, Upload,
};
use oh_core::session::{AppState, LoginProfile, Role, SignupDraft, SignupField};
use oh_core::validation::ValidationError;
use oh_core::verification::{OtpCode, VerificationState, VerificationTarget};
use oh_core::wizard::{WizardError, WizardStep};
use oh_infra::time::TokioCooldownTimer;

#[tokio::test]
async fn public_registration_without_contact_never_calls_backend() {
    let h = Harness::new();
    let wizard = h.public_wizard().await;
    wizard
        .update_draft(|d| {
            fill_public(d);
            d.contact_value = "   ".into();
        })
        .await
        .unwrap();

    let err = wizard.submit_step().await.unwrap_err();

    assert!(matches!(
        err,
        WizardFlowError::StepFailed(WizardError::Validation(ValidationError::MissingContact))
    ));
    assert_eq!(
        h.notifier.errors(),
        vec!["Please provide a phone number or email address"]
    );
    assert_eq!(h.backend.calls(), 0);
    let state = wizard.state().await;
    assert_eq!(state.step, WizardStep::Form);
    assert_eq!(state.position(), 1);
}

#[tokio::test]
async fn public_registration_runs_to_success() {
    let h = Harness::new();
    let wizard = h.public_wizard().await;
    wizard.update_draft(fill_public).await.unwrap();
    let before = wizard.draft().await;

    let state = wizard.submit_step().await.unwrap();
    assert_eq!(state.step, WizardStep::Verification);
    assert_eq!(state.position(), 2);
    assert_eq!(wizard.draft().await, before);
    assert_eq!(
        wizard.receipt().await.unwrap().application_id,
        UserId::from(900)
    );

    assert!(!wizard.can_continue_to_payment().await);
    wizard.send_code().await.unwrap();
    let state = wizard.verify_code("123456").await.unwrap();
    assert!(state.contact_verified);
    assert_eq!(state.step, WizardStep::Verification);
    assert!(wizard.can_continue_to_payment().await);
    assert_eq!(wizard.verification_state().await, VerificationState::Verified);
    // Verifying a registrant is not the operator's own verification.
    assert!(!h.app_state.session().await.phone_verified);

    let state = wizard.submit_step().await.unwrap();
    assert_eq!(state.step, WizardStep::Payment);

    let err = wizard.submit_step().await.unwrap_err();
    assert!(matches!(
        err,
        WizardFlowError::StepFailed(WizardError::Validation(
            ValidationError::MissingPaymentMethod
        ))
    ));

    wizard.select_payment_method(PaymentMethod::Bkash).await;
    let state = wizard.submit_step().await.unwrap();
    assert!(state.is_complete());
    assert_eq!(state.position(), 4);

    let paid = h.gateway.requests();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].amount.value(), 500);
    assert_eq!(paid[0].payee_name, "Ayesha Begum");
    assert_eq!(paid[0].service_code, Some(before.service_code.clone()));

    let messages = h.notifier.messages();
    assert!(messages.contains(&"Registration data saved successfully!".to_string()));
    assert!(messages.contains(&"OTP sent to 01712345678".to_string()));
    assert!(messages.contains(&"Phone Number verified successfully!".to_string()));
    assert!(messages.contains(&"Payment successful via BKASH!".to_string()));
    assert_eq!(
        messages.last().map(String::as_str),
        Some("Payment successful! Digital card will be issued.")
    );
}

#[tokio::test]
async fn server_rejection_keeps_form_step_and_shows_message() {
    let h = Harness::new();
    h.backend.fail_registration(ApiError::from_response(
        400,
        r#"{"errors":{"nid":["This NID is already registered."]}}"#,
    ));
    let wizard = h.public_wizard().await;
    wizard.update_draft(fill_public).await.unwrap();

    let err = wizard.submit_step().await.unwrap_err();

    assert_eq!(err.to_string(), "nid: This NID is already registered.");
    assert_eq!(wizard.state().await.step, WizardStep::Form);
    assert_eq!(wizard.receipt().await, None);
    assert_eq!(
        h.notifier.errors(),
        vec!["nid: This NID is already registered."]
    );
}

#[tokio::test]
async fn verification_step_requires_verified_contact() {
    let h = Harness::new();
    let wizard = h.public_wizard().await;
    wizard.update_draft(fill_public).await.unwrap();
    wizard.submit_step().await.unwrap();

    let err = wizard.submit_step().await.unwrap_err();

    assert!(matches!(
        err,
        WizardFlowError::StepFailed(WizardError::ContactNotVerified)
    ));
    assert_eq!(wizard.state().await.step, WizardStep::Verification);
}

#[tokio::test]
async fn going_back_keeps_answers_and_register_another_resets() {
    let h = Harness::new();
    let wizard = h.public_wizard().await;
    wizard.update_draft(fill_public).await.unwrap();
    wizard.submit_step().await.unwrap();

    let state = wizard.go_back(WizardStep::Form).await.unwrap();
    assert_eq!(state.step, WizardStep::Form);
    assert_eq!(wizard.draft().await.first_name, "Ayesha");

    let state = wizard.go_back(WizardStep::Payment).await.unwrap();
    assert_eq!(state.step, WizardStep::Form);

    wizard.submit_step().await.unwrap();
    wizard.send_code().await.unwrap();
    wizard.verify_code("123456").await.unwrap();
    wizard.submit_step().await.unwrap();
    wizard.select_payment_method(PaymentMethod::Nagad).await;
    wizard.submit_step().await.unwrap();

    let state = wizard.register_another().await.unwrap();
    assert_eq!(state.step, WizardStep::Form);
    assert_eq!(wizard.draft().await.first_name, "");
    assert_eq!(wizard.receipt().await, None);
    assert_eq!(wizard.verification_state().await, VerificationState::Unsent);
}

#[tokio::test]
async fn sub_account_flow_walks_six_steps() {
    let h = Harness::new();
    let wizard = h.sub_account_wizard().await;

    let err = wizard.submit_step().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "No parent account selected. Please go back and select a parent."
    );
    assert_eq!(wizard.state().await.position(), 1);

    wizard
        .update_draft(|d| d.parent = Some(parent()))
        .await
        .unwrap();
    assert_eq!(wizard.submit_step().await.unwrap().step, WizardStep::ConfirmParent);
    assert_eq!(wizard.submit_step().await.unwrap().step, WizardStep::Form);

    let err = wizard.submit_step().await.unwrap_err();
    assert_eq!(err.to_string(), "Please fill all required fields.");
    assert_eq!(h.backend.calls(), 0);

    wizard.update_draft(fill_sub_account).await.unwrap();
    let state = wizard.submit_step().await.unwrap();
    assert_eq!(state.step, WizardStep::Verification);
    assert_eq!(state.position(), 4);

    wizard.send_code().await.unwrap();
    let sent_to = h.backend.last_target().unwrap();
    assert_eq!(sent_to.contact.value, "01799999999");
    assert_eq!(sent_to.user_id, UserId::from(3));

    let state = wizard.verify_code("654321").await.unwrap();
    assert_eq!(state.step, WizardStep::Payment);
    assert!(h
        .notifier
        .messages()
        .contains(&"OTP verified successfully! Proceeding to payment.".to_string()));

    wizard.select_payment_method(PaymentMethod::Nagad).await;
    let state = wizard.submit_step().await.unwrap();
    assert!(state.is_complete());
    assert_eq!(state.total_steps(), 6);
    assert_eq!(
        h.notifier.messages().last().map(String::as_str),
        Some("Payment successful! Sub-account created.")
    );
}

#[tokio::test]
async fn collector_signup_updates_persisted_state() {
    let h = Harness::new();
    let wizard = h.collector_wizard().await;
    wizard
        .update_draft(|d| {
            d.set_field(SignupField::FirstName, "Rahim");
            d.set_field(SignupField::LastName, "Mia");
            d.set_field(SignupField::ContactInfo, "rahim@example.com");
            d.set_field(SignupField::Password, "secret1");
            d.set_field(SignupField::ConfirmPassword, "secret2");
        })
        .await
        .unwrap();

    let err = wizard.submit_step().await.unwrap_err();
    assert_eq!(err.to_string(), "Passwords do not match");
    assert_eq!(h.backend.calls(), 0);
    assert_eq!(h.store.saved().unwrap().signup.first_name, "Rahim");

    wizard
        .update_draft(|d| d.set_field(SignupField::ConfirmPassword, "secret1"))
        .await
        .unwrap();
    wizard.submit_step().await.unwrap();

    let persisted = h.store.saved().unwrap();
    assert_eq!(persisted.signup.application_id, Some(UserId::from(902)));
    assert_eq!(persisted.signup.contact_type, Some(ContactType::Email));
    assert!(!persisted.signup.is_verified());

    wizard.send_code().await.unwrap();
    wizard.verify_code("123456").await.unwrap();
    let snapshot = h.app_state.snapshot().await;
    assert!(snapshot.session.email_verified);
    assert!(snapshot.signup.is_verified());

    wizard.submit_step().await.unwrap();
    h.gateway.decline_next();
    wizard.select_payment_method(PaymentMethod::Bkash).await;
    let err = wizard.submit_step().await.unwrap_err();
    assert_eq!(err.to_string(), "Payment failed. Please try again.");
    assert_eq!(wizard.state().await.step, WizardStep::Payment);

    let state = wizard.submit_step().await.unwrap();
    assert!(state.is_complete());
    assert_eq!(h.gateway.requests()[1].amount.value(), 1000);
    let snapshot = h.app_state.snapshot().await;
    assert!(snapshot.session.payment_made);
    assert_eq!(snapshot.signup, SignupDraft::default());
    assert_eq!(
        h.notifier.messages().last().map(String::as_str),
        Some("Payment successful! Your application is now under review.")
    );
}

async fn submit_collector_form(h: &Harness) {
    let wizard = h.collector_wizard().await;
    wizard
        .update_draft(|d| {
            d.set_field(SignupField::FirstName, "Rahim");
            d.set_field(SignupField::LastName, "Mia");
            d.set_field(SignupField::ContactInfo, "rahim@example.com");
            d.set_field(SignupField::Password, "secret1");
            d.set_field(SignupField::ConfirmPassword, "secret1");
        })
        .await
        .unwrap();
    wizard.submit_step().await.unwrap();
}

#[tokio::test]
async fn interrupted_collector_signup_resumes_at_verification() {
    let h = Harness::new();
    submit_collector_form(&h).await;
    assert_eq!(h.backend.registrations(), 1);

    let h = h.restart().await;
    let wizard = h.collector_wizard().await;

    let state = wizard.state().await;
    assert_eq!(state.step, WizardStep::Verification);
    assert_eq!(state.position(), 2);
    assert!(!state.contact_verified);
    assert_eq!(
        wizard.receipt().await.unwrap().application_id,
        UserId::from(902)
    );

    let err = wizard.submit_step().await.unwrap_err();
    assert!(matches!(
        err,
        WizardFlowError::StepFailed(WizardError::ContactNotVerified)
    ));

    wizard.send_code().await.unwrap();
    assert_eq!(
        h.backend.last_target(),
        Some(VerificationTarget {
            user_id: UserId::from(902),
            contact: Contact::new("rahim@example.com", ContactType::Email),
        })
    );
    wizard.verify_code("123456").await.unwrap();
    assert!(h.store.saved().unwrap().signup.is_verified());
    assert!(h.app_state.session().await.email_verified);

    wizard.submit_step().await.unwrap();
    wizard.select_payment_method(PaymentMethod::Nagad).await;
    assert!(wizard.submit_step().await.unwrap().is_complete());

    let request = &h.gateway.requests()[0];
    assert_eq!(request.payee_id, Some(UserId::from(902)));
    assert_eq!(request.payee_name, "Rahim Mia");
    assert_eq!(h.backend.registrations(), 1);
}

#[tokio::test]
async fn verified_collector_signup_resumes_ready_for_payment() {
    let h = Harness::new();
    {
        submit_collector_form(&h).await;
        let wizard = h.collector_wizard().await;
        wizard.send_code().await.unwrap();
        wizard.verify_code("123456").await.unwrap();
    }

    let h = h.restart().await;
    let wizard = h.collector_wizard().await;

    assert!(wizard.can_continue_to_payment().await);
    assert_eq!(wizard.verification_state().await, VerificationState::Verified);
    assert_eq!(wizard.submit_step().await.unwrap().step, WizardStep::Payment);
    assert_eq!(h.backend.registrations(), 1);
}

#[tokio::test]
async fn unverified_collector_session_resumes_without_a_draft() {
    let h = Harness::new();
    let mut state = AppState::default();
    state.session.login(
        LoginProfile {
            id: UserId::from(77),
            first_name: "Salma".into(),
            last_name: "Khatun".into(),
            email: None,
            phone: Some("01811111111".into()),
            phone_verified: false,
            email_verified: false,
            payment_made: false,
        },
        Role::Collector,
        ContactType::Phone,
    );
    h.store.save(&state).await.unwrap();

    let h = h.restart().await;
    let wizard = h.collector_wizard().await;

    assert_eq!(wizard.state().await.step, WizardStep::Verification);
    wizard.send_code().await.unwrap();
    assert_eq!(
        h.backend.last_target().map(|t| t.user_id),
        Some(UserId::from(77))
    );
    assert_eq!(h.backend.registrations(), 0);
}

#[tokio::test]
async fn fresh_collector_signup_starts_at_the_form() {
    let h = Harness::new();
    let wizard = h.collector_wizard().await;

    assert_eq!(wizard.state().await.step, WizardStep::Form);
    assert_eq!(wizard.receipt().await, None);
    assert!(matches!(
        wizard.send_code().await.unwrap_err(),
        WizardFlowError::Verification(_)
    ));
}

// ---------------------------------------------------------------------------
// Fixtures

fn upload(name: &str) -> Upload {
    Upload::from_file_name(name, vec![0xFF, 0xD8, 0xFF])
}

fn fill_public(draft: &mut PublicRegistrationDraft) {
    draft.first_name = "Ayesha".into();
    draft.last_name = "Begum".into();
    draft.name_bn = "আয়েশা বেগম".into();
    draft.nid = "1990123456789".into();
    draft.date_of_birth = NaiveDate::from_ymd_opt(1990, 4, 12);
    draft.gender = Some(Gender::Female);
    draft.blood_group = Some(BloodGroup::OPositive);
    draft.contact_value = "01712345678".into();
    draft.photo = Some(upload("photo.jpg"));
    draft.signature = Some(upload("signature.png"));
}

fn fill_sub_account(draft: &mut SubAccountDraft) {
    draft.first_name = "Nusrat".into();
    draft.last_name = "Karim".into();
    draft.name_bn = "নুসরাত করিম".into();
    draft.date_of_birth = NaiveDate::from_ymd_opt(2015, 1, 20);
    draft.gender = Some(Gender::Female);
    draft.blood_group = Some(BloodGroup::APositive);
    draft.guardian_nid = "1980123456789".into();
    draft.relationship = Some(Relationship::Daughter);
    draft.photo = Some(upload("child.jpg"));
    draft.signature = Some(upload("guardian.png"));
}

fn parent() -> ParentAccount {
    ParentAccount {
        id: UserId::from(3),
        first_name: "Abdul".into(),
        last_name: "Karim".into(),
        phone: Some("01799999999".into()),
        email: None,
        child_count: 1,
    }
}

struct Harness {
    backend: Arc<FakeBackend>,
    gateway: Arc<FakeGateway>,
    notifier: Arc<RecordingNotifier>,
    store: Arc<MemoryStore>,
    app_state: Arc<AppStateContext>,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        Self {
            backend: Arc::new(FakeBackend::default()),
            gateway: Arc::new(FakeGateway::default()),
            notifier: Arc::new(RecordingNotifier::default()),
            app_state: AppStateContext::new(store.clone()).arc(),
            store,
        }
    }

    fn verification(&self, scope: VerificationScope) -> Arc<ContactVerification> {
        Arc::new(ContactVerification::new(
            self.backend.clone(),
            Arc::new(TokioCooldownTimer::new()),
            self.notifier.clone(),
            self.app_state.clone(),
            60,
            scope,
        ))
    }

    async fn wizard<F: RegistrationFlow>(&self, flow: F) -> WizardOrchestrator<F> {
        let verification = self.verification(flow.scope());
        let payment = Arc::new(CollectPayment::new(
            self.gateway.clone(),
            self.notifier.clone(),
        ));
        WizardOrchestrator::new(flow, verification, payment, self.notifier.clone()).await
    }

    async fn public_wizard(&self) -> WizardOrchestrator<PublicRegistrationFlow> {
        self.wizard(PublicRegistrationFlow::new(
            self.backend.clone(),
            Arc::new(FixedClock),
        ))
        .await
    }

    async fn sub_account_wizard(&self) -> WizardOrchestrator<SubAccountFlow> {
        self.wizard(SubAccountFlow::new(self.backend.clone())).await
    }

    /// Same backend and storage, fresh in-memory state: a new process.
    async fn restart(self) -> Self {
        let app_state = AppStateContext::new(self.store.clone()).arc();
        app_state.rehydrate().await.unwrap();
        Self { app_state, ..self }
    }

    async fn collector_wizard(&self) -> WizardOrchestrator<CollectorSignupFlow> {
        self.wizard(CollectorSignupFlow::new(
            self.backend.clone(),
            self.app_state.clone(),
        ))
        .await
    }
}

#[derive(Default)]
struct FakeBackend {
    calls: AtomicUsize,
    registrations: AtomicUsize,
    registration_error: Mutex<Option<ApiError>>,
    last_target: Mutex<Option<VerificationTarget>>,
}

impl FakeBackend {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    fn fail_registration(&self, err: ApiError) {
        *self.registration_error.lock().unwrap() = Some(err);
    }

    fn last_target(&self) -> Option<VerificationTarget> {
        self.last_target.lock().unwrap().clone()
    }

    fn respond(&self, id: i64, first: &str, last: &str, contact: Contact) -> Result<RegistrationReceipt, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.registrations.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.registration_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(RegistrationReceipt {
            application_id: UserId::from(id),
            first_name: first.to_string(),
            last_name: last.to_string(),
            contact,
        })
    }
}

#[async_trait]
impl RegistrationPort for FakeBackend {
    async fn register_collector(
        &self,
        draft: &SignupDraft,
        contact: &Contact,
    ) -> Result<RegistrationReceipt, ApiError> {
        self.respond(902, &draft.first_name, &draft.last_name, contact.clone())
    }

    async fn register_public_user(
        &self,
        draft: &PublicRegistrationDraft,
        contact: &Contact,
    ) -> Result<RegistrationReceipt, ApiError> {
        self.respond(900, &draft.first_name, &draft.last_name, contact.clone())
    }

    async fn register_sub_account(
        &self,
        draft: &SubAccountDraft,
        parent: &ParentAccount,
    ) -> Result<RegistrationReceipt, ApiError> {
        let contact = parent
            .contact()
            .ok_or_else(|| ApiError::Decode("parent has no contact".into()))?;
        self.respond(901, &draft.first_name, &draft.last_name, contact)
    }

    async fn search_parent_accounts(&self, _term: &str) -> Result<Vec<ParentAccount>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![parent()])
    }
}

#[async_trait]
impl OtpPort for FakeBackend {
    async fn send_otp(&self, target: &VerificationTarget) -> Result<String, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_target.lock().unwrap() = Some(target.clone());
        Ok("OTP sent successfully".into())
    }

    async fn verify_otp(&self, _user_id: &UserId, code: &OtpCode) -> Result<String, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if code.as_str() == "000000" {
            return Err(ApiError::from_response(400, r#"{"otp":["Invalid OTP"]}"#));
        }
        Ok("OTP verified successfully".into())
    }
}

#[derive(Default)]
struct FakeGateway {
    requests: Mutex<Vec<PaymentRequest>>,
    decline_next: Mutex<bool>,
}

impl FakeGateway {
    fn requests(&self) -> Vec<PaymentRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn decline_next(&self) {
        *self.decline_next.lock().unwrap() = true;
    }
}

#[async_trait]
impl PaymentGatewayPort for FakeGateway {
    async fn pay(&self, request: &PaymentRequest) -> anyhow::Result<PaymentOutcome> {
        self.requests.lock().unwrap().push(request.clone());
        let decline = std::mem::take(&mut *self.decline_next.lock().unwrap());
        if decline {
            return Ok(PaymentOutcome::Failed {
                reason: String::new(),
            });
        }
        Ok(PaymentOutcome::Succeeded {
            method: request.method,
            reference: PaymentReference::new(),
        })
    }
}

#[derive(Default)]
struct MemoryStore {
    saved: Mutex<Option<AppState>>,
}

impl MemoryStore {
    fn saved(&self) -> Option<AppState> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl AppStateStorePort for MemoryStore {
    async fn load(&self) -> anyhow::Result<AppState> {
        Ok(self.saved().unwrap_or_default())
    }

    async fn save(&self, state: &AppState) -> anyhow::Result<()> {
        *self.saved.lock().unwrap() = Some(state.clone());
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        *self.saved.lock().unwrap() = None;
        Ok(())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }

    fn errors(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.level == NotificationLevel::Error)
            .map(|n| n.message.clone())
            .collect()
    }
}

impl NotificationPort for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

struct FixedClock;

impl ClockPort for FixedClock {
    fn now_ms(&self) -> i64 {
        1_700_000_000_000
    }
}
