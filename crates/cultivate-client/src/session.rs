//! # Session
//!
//! Explicit session object: the in-memory credential pair and user, mirrored
//! into an injected [`CredentialStore`]. The client receives a session, it
//! never owns hidden global token state.
//!
//! ## Invariants
//!
//! - Access and refresh token are both present or both absent. A partial pair
//!   found in storage at load time is discarded and storage is cleared.
//! - Memory is authoritative. Writes update memory first and then mirror to
//!   storage; a storage failure is reported but never rolls memory back.
//! - Tokens live in [`Zeroizing`] buffers and never appear in `Debug` output.
//!
//! The session also owns the refresh gate: the async mutex that serializes
//! token refreshes so concurrent 401s produce a single refresh call.

use std::fmt;
use std::sync::Arc;

use cultivate_core::{AuthResponse, FacilityId, TokenPair, User};
use parking_lot::RwLock;
use zeroize::Zeroizing;

use crate::storage::{CredentialStore, StorageError, StorageKey};

#[derive(Default)]
struct Credentials {
    access_token: Option<Zeroizing<String>>,
    refresh_token: Option<Zeroizing<String>>,
    /// Raw JSON as stored. Parsed on demand so that a user object written by
    /// an older schema still yields its facility id.
    user_json: Option<String>,
}

/// Session credentials plus the store they are mirrored to.
pub struct Session {
    store: Arc<dyn CredentialStore>,
    state: RwLock<Credentials>,
    refresh_gate: tokio::sync::Mutex<()>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Session")
            .field("access_token", &state.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &state.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("has_user", &state.user_json.is_some())
            .finish()
    }
}

impl Session {
    /// Start from an empty session without reading the store.
    pub fn empty(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            state: RwLock::new(Credentials::default()),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Restore the session from storage.
    pub fn load(store: Arc<dyn CredentialStore>) -> Result<Self, StorageError> {
        let access = store.get(StorageKey::AccessToken)?;
        let refresh = store.get(StorageKey::RefreshToken)?;
        let user_json = store.get(StorageKey::User)?;

        let session = Self::empty(store);
        match (access, refresh) {
            (Some(access), Some(refresh)) => {
                let mut state = session.state.write();
                state.access_token = Some(Zeroizing::new(access));
                state.refresh_token = Some(Zeroizing::new(refresh));
                state.user_json = user_json;
            }
            (None, None) => {
                session.state.write().user_json = user_json;
            }
            _ => {
                tracing::warn!("discarding partial credential state found in storage");
                session.store.clear()?;
            }
        }
        Ok(session)
    }

    /// Current access token, if any.
    pub fn access_token(&self) -> Option<Zeroizing<String>> {
        self.state.read().access_token.clone()
    }

    /// Current refresh token, if any.
    pub fn refresh_token(&self) -> Option<Zeroizing<String>> {
        self.state.read().refresh_token.clone()
    }

    pub fn has_refresh_token(&self) -> bool {
        self.state.read().refresh_token.is_some()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().access_token.is_some()
    }

    /// The stored user, if present and parseable.
    pub fn user(&self) -> Option<User> {
        let state = self.state.read();
        let raw = state.user_json.as_deref()?;
        serde_json::from_str(raw).ok()
    }

    /// Facility id from the stored user object.
    ///
    /// Reads `facilityId` or `facility_id` from the raw JSON, so a partial
    /// user object still scopes requests.
    pub fn facility_id(&self) -> Option<FacilityId> {
        let state = self.state.read();
        let raw = state.user_json.as_deref()?;
        let value: serde_json::Value = serde_json::from_str(raw).ok()?;
        value
            .get("facilityId")
            .or_else(|| value.get("facility_id"))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(FacilityId::new)
    }

    /// Install credentials from a successful login.
    pub fn establish(&self, auth: &AuthResponse) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(&auth.user).map_err(|source| StorageError::Serialize {
            key: StorageKey::User,
            source,
        })?;
        {
            let mut state = self.state.write();
            state.access_token = Some(Zeroizing::new(auth.token.clone()));
            state.refresh_token = Some(Zeroizing::new(auth.refresh_token.clone()));
            state.user_json = Some(user_json.clone());
        }
        self.store.set(StorageKey::AccessToken, &auth.token)?;
        self.store.set(StorageKey::RefreshToken, &auth.refresh_token)?;
        self.store.set(StorageKey::User, &user_json)
    }

    /// Replace the token pair after a refresh. The user is kept.
    pub fn replace_tokens(&self, pair: &TokenPair) -> Result<(), StorageError> {
        {
            let mut state = self.state.write();
            state.access_token = Some(Zeroizing::new(pair.token.clone()));
            state.refresh_token = Some(Zeroizing::new(pair.refresh_token.clone()));
        }
        self.store.set(StorageKey::AccessToken, &pair.token)?;
        self.store.set(StorageKey::RefreshToken, &pair.refresh_token)
    }

    /// Replace the stored user object, e.g. after `GET /auth/me`.
    pub fn set_user(&self, user: &User) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(user).map_err(|source| StorageError::Serialize {
            key: StorageKey::User,
            source,
        })?;
        self.state.write().user_json = Some(user_json.clone());
        self.store.set(StorageKey::User, &user_json)
    }

    /// Drop all three values from memory and storage.
    pub fn clear(&self) -> Result<(), StorageError> {
        *self.state.write() = Credentials::default();
        self.store.clear()
    }

    pub(crate) fn refresh_gate(&self) -> &tokio::sync::Mutex<()> {
        &self.refresh_gate
    }
}
