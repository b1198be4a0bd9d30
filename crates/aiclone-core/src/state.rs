//! Pure state transitions for the session store.
//!
//! Nothing here touches storage or observers; `SessionStore` applies these
//! transitions and then persists and publishes the result.

use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Everything the store holds. Serialized as `{ "user": Session | null }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserState {
    pub user: Option<Session>,
}

impl UserState {
    pub fn new(user: Option<Session>) -> Self {
        Self { user }
    }

    /// Replace the whole session. No merge with the previous one.
    pub fn set_session(&mut self, session: Session) {
        self.user = Some(session);
    }

    /// Replace only the credit balance. Returns false when logged out,
    /// in which case nothing changes.
    pub fn update_credits(&mut self, credits: u64) -> bool {
        match self.user.as_mut() {
            Some(user) => {
                user.credits = credits;
                true
            }
            None => false,
        }
    }

    /// Returns whether a session was actually cleared.
    pub fn logout(&mut self) -> bool {
        self.user.take().is_some()
    }
}
