use std::collections::HashMap;

use shared::{error::SessionError, protocol::SessionUser};

pub const SESSION_USER_KEY: &str = "user";

/// Key-value view over the browser-style local session.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Default, Clone)]
pub struct MemorySessionStore {
    entries: HashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: &SessionUser) -> Result<Self, SessionError> {
        let mut store = Self::new();
        store.set(SESSION_USER_KEY, serde_json::to_string(user)?);
        Ok(store)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl From<HashMap<String, String>> for MemorySessionStore {
    fn from(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

/// Reads the current user out of the session, once, so it can be handed to
/// the controllers explicitly.
pub fn load_session_user(store: &dyn SessionStore) -> Result<SessionUser, SessionError> {
    let raw = store
        .get(SESSION_USER_KEY)
        .ok_or(SessionError::MissingUser)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use shared::domain::UserType;

    use super::*;

    #[test]
    fn loads_user_written_as_json() {
        let mut store = MemorySessionStore::new();
        store.set(
            SESSION_USER_KEY,
            r#"{"type":"Employee","email":"employee@test.tld"}"#,
        );

        let user = load_session_user(&store).expect("user");
        assert_eq!(user.user_type, UserType::Employee);
        assert_eq!(user.email, "employee@test.tld");
    }

    #[test]
    fn missing_user_is_reported() {
        let store = MemorySessionStore::new();
        assert!(matches!(
            load_session_user(&store),
            Err(SessionError::MissingUser)
        ));
    }

    #[test]
    fn malformed_user_is_reported() {
        let mut store = MemorySessionStore::new();
        store.set(SESSION_USER_KEY, "not json");
        assert!(matches!(
            load_session_user(&store),
            Err(SessionError::Malformed(_))
        ));
    }

    #[test]
    fn with_user_round_trips() {
        let user = SessionUser {
            user_type: UserType::Admin,
            email: "admin@test.tld".into(),
        };
        let store = MemorySessionStore::with_user(&user).expect("store");
        assert_eq!(load_session_user(&store).expect("user"), user);
    }
}
