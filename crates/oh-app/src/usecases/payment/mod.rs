mod collect_payment;

pub use collect_payment::{CollectPayment, CollectPaymentError};
