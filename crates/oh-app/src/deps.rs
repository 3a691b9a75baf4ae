//! # Application Dependencies / 应用依赖
//!
//! Groups the ports the use cases are built from. This is NOT a builder:
//! every field is required and nothing has a default.

use std::sync::Arc;

use oh_core::ports::*;

pub struct AppDeps {
    // Backend
    pub auth: Arc<dyn AuthPort>,
    pub registration: Arc<dyn RegistrationPort>,
    pub otp: Arc<dyn OtpPort>,
    pub address: Arc<dyn AddressLookupPort>,

    // Payment
    pub payment: Arc<dyn PaymentGatewayPort>,

    // Local state and time
    pub state_store: Arc<dyn AppStateStorePort>,
    pub cooldown: Arc<dyn CooldownTimerPort>,
    pub clock: Arc<dyn ClockPort>,

    // UI
    pub notifier: Arc<dyn NotificationPort>,
}
