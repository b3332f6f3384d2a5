//! # cultivate-client: Typed Rust client for the CultivateCo API
//!
//! One authenticated request surface for the dashboard API:
//! - **Auth** via `/auth/login`, `/auth/logout`, `/auth/me`
//! - **Facilities** via `/facilities`
//! - **Compliance** via `/compliance/status` and `/compliance/alerts`
//! - **Inventory** via `/inventory`
//!
//! Plus raw access through [`ApiClient::request`] for endpoints without a
//! typed wrapper.
//!
//! ## Architecture
//!
//! Session state is an explicit [`Session`] built over an injected
//! [`CredentialStore`]. All typed sub-clients share one [`ApiClient`], which
//! attaches the bearer token, the facility header, and a request timestamp,
//! classifies failures into [`ErrorCategory`], and refreshes an expired
//! access token at most once per 401 (coalesced across concurrent calls).
//!
//! An unrecoverable 401 comes back as [`ApiError::SessionExpired`]; what to
//! do about it (redirect, prompt, exit) is the caller's decision.

pub mod auth;
pub mod client;
pub mod compliance;
pub mod config;
pub mod error;
pub mod facilities;
pub mod inventory;
pub mod session;
pub mod storage;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use cultivate_core::ErrorCategory;
pub use error::ApiError;
pub use reqwest::Method;
pub use session::Session;
pub use storage::{CredentialStore, FileStore, MemoryStore, StorageError, StorageKey};

use std::sync::Arc;

/// Top-level client. Holds sub-clients for each API area.
#[derive(Debug, Clone)]
pub struct CultivateClient {
    api: ApiClient,
    auth: auth::AuthClient,
    facilities: facilities::FacilityClient,
    compliance: compliance::ComplianceClient,
    inventory: inventory::InventoryClient,
}

impl CultivateClient {
    /// Create a client, restoring any session persisted in `store`.
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        let session = Arc::new(Session::load(store)?);
        Self::with_session(config, session)
    }

    /// Create a client over an existing session.
    pub fn with_session(config: ClientConfig, session: Arc<Session>) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config, session)?;
        Ok(Self {
            auth: auth::AuthClient::new(api.clone()),
            facilities: facilities::FacilityClient::new(api.clone()),
            compliance: compliance::ComplianceClient::new(api.clone()),
            inventory: inventory::InventoryClient::new(api.clone()),
            api,
        })
    }

    /// Raw request surface.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Arc<Session> {
        self.api.session()
    }

    pub fn auth(&self) -> &auth::AuthClient {
        &self.auth
    }

    pub fn facilities(&self) -> &facilities::FacilityClient {
        &self.facilities
    }

    pub fn compliance(&self) -> &compliance::ComplianceClient {
        &self.compliance
    }

    pub fn inventory(&self) -> &inventory::InventoryClient {
        &self.inventory
    }
}
