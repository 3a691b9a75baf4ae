//! Role-based route guard.

use serde::{Deserialize, Serialize};

use crate::session::{Role, Session};

pub const LOGIN_PATH: &str = "/login";
pub const COLLECTOR_VERIFY_PATH: &str = "/signup/collector/verify";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteDecision {
    Allow,
    Redirect(String),
}

impl RouteDecision {
    fn redirect(path: &str) -> Self {
        RouteDecision::Redirect(path.to_string())
    }
}

pub struct RouteGuard;

impl RouteGuard {
    /// Pages reachable without a session.
    pub fn is_public(path: &str) -> bool {
        path == "/" || path == LOGIN_PATH || under(path, "/signup")
    }

    pub fn evaluate(session: &Session, path: &str) -> RouteDecision {
        let path = normalize(path);

        let Some(role) = session.active_role() else {
            return if Self::is_public(path) {
                RouteDecision::Allow
            } else {
                RouteDecision::redirect(LOGIN_PATH)
            };
        };

        match role {
            Role::Collector if !session.is_contact_verified() => {
                if path == COLLECTOR_VERIFY_PATH {
                    RouteDecision::Allow
                } else {
                    RouteDecision::redirect(COLLECTOR_VERIFY_PATH)
                }
            }
            Role::Collector => {
                if path == LOGIN_PATH || under(path, "/admin") || under(path, "/user") {
                    RouteDecision::redirect(role.dashboard_path())
                } else {
                    RouteDecision::Allow
                }
            }
            Role::Admin => stay_under(path, "/admin", role),
            Role::Public => stay_under(path, "/user", role),
        }
    }
}

fn stay_under(path: &str, prefix: &str, role: Role) -> RouteDecision {
    if under(path, prefix) {
        RouteDecision::Allow
    } else {
        RouteDecision::redirect(role.dashboard_path())
    }
}

fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}
