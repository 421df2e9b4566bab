//! Credential store seam.
//!
//! The bearer token and the user id are owned by an external store; the client
//! only reads them, and writes back a user id the server assigns.

use keyring::Entry;
use std::env;
use std::sync::RwLock;
use tracing::warn;

pub trait CredentialStore: Send + Sync {
    fn token(&self) -> Option<String>;

    fn user_id(&self) -> Option<String>;

    fn set_user_id(&self, user_id: &str);
}

/// In-memory credentials, for tests and embedding applications that manage
/// their own storage.
#[derive(Debug, Default)]
pub struct StaticCredentials {
    token: Option<String>,
    user_id: RwLock<Option<String>>,
}

impl StaticCredentials {
    pub fn new(token: Option<String>, user_id: Option<String>) -> Self {
        Self {
            token,
            user_id: RwLock::new(user_id),
        }
    }
}

impl CredentialStore for StaticCredentials {
    fn token(&self) -> Option<String> {
        self.token.clone()
    }

    fn user_id(&self) -> Option<String> {
        self.user_id.read().ok().and_then(|g| g.clone())
    }

    fn set_user_id(&self, user_id: &str) {
        if let Ok(mut guard) = self.user_id.write() {
            *guard = Some(user_id.to_string());
        }
    }
}

/// OS keyring entries under one service name, falling back to
/// `CHAT_AUTH_TOKEN` / `CHAT_USER_ID`.
#[derive(Debug, Clone)]
pub struct KeyringCredentials {
    service: String,
}

const TOKEN_ENTRY: &str = "auth_token";
const USER_ID_ENTRY: &str = "user_id";

impl KeyringCredentials {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn lookup(&self, entry: &str, env_var: &str) -> Option<String> {
        // 1. Try Keyring
        if let Ok(entry) = Entry::new(&self.service, entry) {
            if let Ok(value) = entry.get_password() {
                return Some(value);
            }
        }

        // 2. Try Environment Variable
        env::var(env_var).ok().filter(|v| !v.is_empty())
    }
}

impl Default for KeyringCredentials {
    fn default() -> Self {
        Self::new("chat-transport")
    }
}

impl CredentialStore for KeyringCredentials {
    fn token(&self) -> Option<String> {
        self.lookup(TOKEN_ENTRY, "CHAT_AUTH_TOKEN")
    }

    fn user_id(&self) -> Option<String> {
        self.lookup(USER_ID_ENTRY, "CHAT_USER_ID")
    }

    fn set_user_id(&self, user_id: &str) {
        let stored = Entry::new(&self.service, USER_ID_ENTRY)
            .and_then(|entry| entry.set_password(user_id));
        if let Err(e) = stored {
            warn!(error = %e, "[chat_transport] could not persist user id");
        }
    }
}
