//! Shared fixtures for client contract tests.

#![allow(dead_code)]

use std::sync::Arc;

use cultivate_client::{ClientConfig, CredentialStore, CultivateClient, MemoryStore, StorageKey};
use wiremock::MockServer;

/// A store holding a complete session for `fac_001`.
pub fn seeded_store(access: &str, refresh: &str) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.set(StorageKey::AccessToken, access).unwrap();
    store.set(StorageKey::RefreshToken, refresh).unwrap();
    store
        .set(
            StorageKey::User,
            &serde_json::json!({
                "id": "usr_1",
                "email": "grower@example.com",
                "firstName": "Sam",
                "lastName": "Ortiz",
                "role": "manager",
                "facilityId": "fac_001"
            })
            .to_string(),
        )
        .unwrap();
    store
}

/// Build a client with its base URL pointed at `{mock}/api`.
pub fn client_for(mock_server: &MockServer, store: Arc<MemoryStore>) -> CultivateClient {
    let config = ClientConfig::new(&format!("{}/api", mock_server.uri()))
        .unwrap()
        .with_timeout(5);
    CultivateClient::new(config, store).unwrap()
}

/// The login response body the mock server hands out.
pub fn auth_body(token: &str, refresh: &str) -> serde_json::Value {
    serde_json::json!({
        "token": token,
        "refreshToken": refresh,
        "user": {
            "id": "usr_1",
            "email": "grower@example.com",
            "firstName": "Sam",
            "lastName": "Ortiz",
            "role": "manager",
            "facilityId": "fac_001"
        }
    })
}
