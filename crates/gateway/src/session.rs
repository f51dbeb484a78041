//! Session state: access/refresh tokens and the logged-in user profile.
//!
//! The client depends on the [`SessionStore`] trait only; nothing else in
//! the crate reads credential state directly.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Profile returned by the accounts endpoints at login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Process-wide session state with an explicit lifecycle: login creates
/// it, a token refresh mutates it, logout tears it down.
pub trait SessionStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    fn user(&self) -> Option<UserProfile>;
    fn set_tokens(&self, access: String, refresh: String);
    fn set_access(&self, access: String);
    fn set_user(&self, user: UserProfile);
    fn clear(&self);
}

#[derive(Debug, Default)]
struct SessionState {
    access: Option<String>,
    refresh: Option<String>,
    user: Option<UserProfile>,
}

/// In-memory session store, the default implementation.
#[derive(Debug, Default)]
pub struct MemorySession {
    state: RwLock<SessionState>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySession {
    fn access_token(&self) -> Option<String> {
        self.state.read().ok().and_then(|s| s.access.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.state.read().ok().and_then(|s| s.refresh.clone())
    }

    fn user(&self) -> Option<UserProfile> {
        self.state.read().ok().and_then(|s| s.user.clone())
    }

    fn set_tokens(&self, access: String, refresh: String) {
        if let Ok(mut s) = self.state.write() {
            s.access = Some(access);
            s.refresh = Some(refresh);
        }
    }

    fn set_access(&self, access: String) {
        if let Ok(mut s) = self.state.write() {
            s.access = Some(access);
        }
    }

    fn set_user(&self, user: UserProfile) {
        if let Ok(mut s) = self.state.write() {
            s.user = Some(user);
        }
    }

    fn clear(&self) {
        if let Ok(mut s) = self.state.write() {
            *s = SessionState::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_replaces_only_the_access_token() {
        let session = MemorySession::new();
        session.set_tokens("a1".into(), "r1".into());
        session.set_access("a2".into());
        assert_eq!(session.access_token().as_deref(), Some("a2"));
        assert_eq!(session.refresh_token().as_deref(), Some("r1"));
    }

    #[test]
    fn clear_tears_down_everything() {
        let session = MemorySession::new();
        session.set_tokens("a".into(), "r".into());
        session.set_user(UserProfile {
            id: Some(1),
            username: "admin".into(),
            email: None,
            role: Some("admin".into()),
        });
        session.clear();
        assert!(session.access_token().is_none());
        assert!(session.refresh_token().is_none());
        assert!(session.user().is_none());
    }
}
