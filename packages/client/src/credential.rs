//! Process-wide credential store.
//!
//! The store is a cloneable handle around a `tokio::sync::watch` channel, so
//! every holder reads the live value and `clear()` is observable by any
//! component that subscribed.

use std::sync::Arc;

use tokio::sync::watch;

/// Access/refresh token pair.
///
/// `access_token` is `None` only while the session is unauthenticated (guest).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Credential {
    /// Credential issued by a successful login
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Partial update applied by [`CredentialStore::set`].
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialUpdate {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl CredentialUpdate {
    pub fn access_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            refresh_token: None,
        }
    }

    pub fn with_refresh_token(mut self, token: Option<String>) -> Self {
        self.refresh_token = token;
        self
    }
}

/// Shared credential cell
#[derive(Debug, Clone)]
pub struct CredentialStore {
    cell: Arc<watch::Sender<Credential>>,
}

impl CredentialStore {
    /// Create a store in the guest state
    pub fn new() -> Self {
        Self::with_credential(Credential::default())
    }

    pub fn with_credential(credential: Credential) -> Self {
        let (cell, _) = watch::channel(credential);
        Self {
            cell: Arc::new(cell),
        }
    }

    /// Current credential
    pub fn get(&self) -> Credential {
        self.cell.borrow().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.cell.borrow().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.cell.borrow().refresh_token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.cell.borrow().is_authenticated()
    }

    /// Merge a partial update into the current credential
    pub fn set(&self, update: CredentialUpdate) {
        self.cell.send_modify(|credential| {
            if let Some(access_token) = update.access_token {
                credential.access_token = Some(access_token);
            }
            if let Some(refresh_token) = update.refresh_token {
                credential.refresh_token = Some(refresh_token);
            }
        });
    }

    /// Replace the whole credential (login)
    pub fn replace(&self, credential: Credential) {
        self.cell.send_replace(credential);
    }

    /// Return to the guest state (logout)
    pub fn clear(&self) {
        self.cell.send_replace(Credential::default());
    }

    /// Observe every change, including `clear()`
    pub fn subscribe(&self) -> watch::Receiver<Credential> {
        self.cell.subscribe()
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}
