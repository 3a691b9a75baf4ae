//! Console stand-in for toast notifications.

use std::io::{self, Write};
use std::sync::Mutex;

use oh_core::ports::{Notification, NotificationLevel, NotificationPort};
use tracing::debug;

pub struct ConsoleNotifier<W: Write + Send = io::Stdout> {
    out: Mutex<W>,
}

impl ConsoleNotifier<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn marker(level: NotificationLevel) -> &'static str {
    match level {
        NotificationLevel::Info => "[info]",
        NotificationLevel::Success => "[ok]",
        NotificationLevel::Error => "[error]",
    }
}

impl<W: Write + Send> NotificationPort for ConsoleNotifier<W> {
    fn notify(&self, notification: Notification) {
        debug!(level = ?notification.level, message = %notification.message, "notification");
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        // A closed stdout only loses the toast.
        let _ = writeln!(out, "{} {}", marker(notification.level), notification.message);
        let _ = out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_marked_line_per_notification() {
        let notifier = ConsoleNotifier::new(Vec::new());

        notifier.notify(Notification::success("OTP sent to 01712345678"));
        notifier.notify(Notification::error("Passwords do not match"));
        notifier.notify(Notification::info("Please complete the payment to proceed."));

        let written = String::from_utf8(notifier.into_inner()).unwrap();
        assert_eq!(
            written,
            "[ok] OTP sent to 01712345678\n\
             [error] Passwords do not match\n\
             [info] Please complete the payment to proceed.\n"
        );
    }
}
