use serde::{Deserialize, Serialize};

use super::{Session, SignupDraft};

/// The single persisted application state: session hints plus the signup draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    pub session: Session,
    pub signup: SignupDraft,
}

impl AppState {
    /// Repairs data loaded from storage so that domain rules hold again.
    pub fn rehydrated(self) -> Self {
        Self {
            session: self.session.normalized(),
            signup: self.signup,
        }
    }

    /// Logout wipes both the session and any pending signup.
    pub fn clear(&mut self) {
        self.session.logout();
        self.signup.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_partial_documents_with_defaults() {
        let state: AppState = serde_json::from_str(r#"{"session":{"first_name":"Rina"}}"#).unwrap();
        assert_eq!(state.session.first_name, "Rina");
        assert!(!state.session.authenticated);
        assert_eq!(state.signup, SignupDraft::default());
    }
}
