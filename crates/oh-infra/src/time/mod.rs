mod cooldown;
mod system_clock;

pub use cooldown::TokioCooldownTimer;
pub use system_clock::SystemClock;
