//! Login credentials for indexer accounts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Username/password pair for an indexer account.
///
/// `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// JSON login body with surrounding whitespace stripped from both values.
    pub fn login_body(&self) -> serde_json::Value {
        serde_json::json!({
            "username": self.username.trim(),
            "password": self.password.trim(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Source of the credentials an indexer logs in with.
pub trait CredentialStore: Send + Sync {
    fn credentials(&self) -> Credentials;
}

/// Credentials fixed at construction time (usually read from config).
#[derive(Debug, Clone)]
pub struct StaticCredentialStore {
    credentials: Credentials,
}

impl StaticCredentialStore {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialStore for StaticCredentialStore {
    fn credentials(&self) -> Credentials {
        self.credentials.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("alice", "hunter2");
        let debug = format!("{:?}", creds);

        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_login_body_trims_values() {
        let creds = Credentials::new("  alice ", "\thunter2\n");
        let body = creds.login_body();

        assert_eq!(body["username"], "alice");
        assert_eq!(body["password"], "hunter2");
        assert_eq!(body.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_static_store_returns_credentials() {
        let store = StaticCredentialStore::new(Credentials::new("bob", "secret"));
        assert_eq!(store.credentials(), Credentials::new("bob", "secret"));
    }
}
