use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info_span};

use oh_core::route_guard::{RouteDecision, RouteGuard};
use oh_core::session::Session;

use super::session::AppStateContext;

/// Evaluates navigation against the current session.
pub struct GuardRoute {
    app_state: Arc<AppStateContext>,
}

impl GuardRoute {
    pub fn new(app_state: Arc<AppStateContext>) -> Self {
        Self { app_state }
    }

    pub async fn execute(&self, path: &str) -> RouteDecision {
        let session = self.app_state.session().await;
        let _span = info_span!("usecase.guard_route.execute", path).entered();
        let decision = RouteGuard::evaluate(&session, path);
        debug!(?decision, "route evaluated");
        decision
    }

    /// Follows `path` across session changes.
    pub fn watch(&self, path: impl Into<String>) -> RouteWatch {
        RouteWatch {
            path: path.into(),
            sessions: self.app_state.subscribe(),
        }
    }
}

/// Re-evaluates one path whenever the session changes.
pub struct RouteWatch {
    path: String,
    sessions: watch::Receiver<Session>,
}

impl RouteWatch {
    pub fn current(&self) -> RouteDecision {
        RouteGuard::evaluate(&self.sessions.borrow(), &self.path)
    }

    /// Waits for the next session change. `None` once the state is gone.
    pub async fn changed(&mut self) -> Option<RouteDecision> {
        self.sessions.changed().await.ok()?;
        let decision = RouteGuard::evaluate(&self.sessions.borrow_and_update(), &self.path);
        debug!(path = %self.path, ?decision, "route re-evaluated after session change");
        Some(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_state;
    use oh_core::session::Role;

    #[tokio::test]
    async fn watch_follows_verification_of_collector() {
        let state = memory_state();
        state
            .update(|s| {
                s.session.authenticated = true;
                s.session.role = Some(Role::Collector);
            })
            .await
            .unwrap();
        let guard = GuardRoute::new(state.clone());
        let mut watch = guard.watch("/collector/dashboard");

        assert_eq!(
            watch.current(),
            RouteDecision::Redirect("/signup/collector/verify".into())
        );

        state
            .update(|s| s.session.set_email_verified(true))
            .await
            .unwrap();

        assert_eq!(watch.changed().await, Some(RouteDecision::Allow));
        assert_eq!(
            guard.execute("/admin/users").await,
            RouteDecision::Redirect("/collector/dashboard".into())
        );
    }

    #[tokio::test]
    async fn anonymous_session_is_sent_to_login() {
        let guard = GuardRoute::new(memory_state());
        assert_eq!(
            guard.execute("/user/dashboard").await,
            RouteDecision::Redirect("/login".into())
        );
        assert_eq!(guard.execute("/signup/public").await, RouteDecision::Allow);
    }
}
