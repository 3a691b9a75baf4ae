mod simulated;
mod unconfigured;

pub use simulated::{SimulatedPaymentGateway, DEFAULT_PROCESSING_DELAY, DEFAULT_SUCCESS_RATE};
pub use unconfigured::UnconfiguredPaymentGateway;
