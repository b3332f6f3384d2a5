//! End-to-end session lifecycle against the in-memory API stub.

use std::sync::Arc;

use cultivate_client::compliance::AlertFilter;
use cultivate_client::inventory::InventoryFilter;
use cultivate_client::{ClientConfig, CredentialStore, CultivateClient, ErrorCategory, FileStore};
use cultivate_core::{ComplianceLevel, FacilityId, ProductCategory};
use cultivate_stub::{AppState, DEMO_EMAIL, DEMO_PASSWORD};

async fn start_stub() -> (AppState, ClientConfig) {
    let state = AppState::new();
    let addr = cultivate_stub::spawn("127.0.0.1:0".parse().unwrap(), state.clone())
        .await
        .unwrap();
    (state, ClientConfig::local(addr.port()).unwrap())
}

#[tokio::test]
async fn full_session_lifecycle() {
    let (state, config) = start_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path().join("session.json")));
    let client = CultivateClient::new(config.clone(), store.clone()).unwrap();

    let user = client.auth().login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
    assert_eq!(user.facility_id, Some(FacilityId::new("fac_001")));

    let facilities = client.facilities().list().await.unwrap();
    assert_eq!(facilities.len(), 2);

    let status = client.compliance().status().await.unwrap();
    assert_eq!(status.facility_id, FacilityId::new("fac_001"));
    assert_eq!(status.score, 85);
    assert_eq!(status.level, ComplianceLevel::Warning);

    let open = client.compliance().alerts(&AlertFilter::open()).await.unwrap();
    assert_eq!(open.len(), 2);

    // Expire the access token server-side; the next call refreshes silently.
    let stale = client.session().access_token().unwrap();
    state.expire(&stale);

    let flower = client
        .inventory()
        .list(&InventoryFilter {
            category: Some(ProductCategory::Flower),
            search: None,
        })
        .await
        .unwrap();
    assert_eq!(flower.len(), 1);
    let fresh = client.session().access_token().unwrap();
    assert_ne!(fresh.as_str(), stale.as_str());

    // A second client over the same file picks up the rotated session.
    let restored = CultivateClient::new(config, store.clone()).unwrap();
    assert!(restored.auth().is_authenticated());
    assert_eq!(restored.auth().current_user().await.unwrap().id, user.id);

    client.auth().logout().await.unwrap();
    assert!(store.get(cultivate_client::StorageKey::AccessToken).unwrap().is_none());

    let err = client.auth().current_user().await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Authentication);
    assert!(!err.is_session_expired());
}

#[tokio::test]
async fn revoked_refresh_token_expires_session() {
    let (state, config) = start_stub().await;
    let store = Arc::new(cultivate_client::MemoryStore::new());
    let client = CultivateClient::new(config, store.clone()).unwrap();

    client.auth().login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
    let token = client.session().access_token().unwrap();
    // Revocation kills the access token and every refresh token with it.
    state.revoke(&token);

    let err = client.facilities().list().await.unwrap_err();
    assert!(err.is_session_expired(), "got {err:?}");
    assert!(store.is_empty());
}

#[tokio::test]
async fn duplicate_metrc_tag_is_conflict_end_to_end() {
    let (_state, config) = start_stub().await;
    let client = CultivateClient::new(config, Arc::new(cultivate_client::MemoryStore::new())).unwrap();
    client.auth().login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

    let req = cultivate_core::CreateInventoryItem {
        name: "Blue Dream Flower".into(),
        category: ProductCategory::Flower,
        sku: "BD-FLW-2".into(),
        quantity: 2,
        unit: "lb".into(),
        thc_percent: Some(21.0),
        metrc_tag: Some("1A4FF0100000022000000123".into()),
    };
    let err = client.inventory().create(&req).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Conflict);
    assert!(err.message().contains("already assigned"));

    let created = client
        .inventory()
        .create(&cultivate_core::CreateInventoryItem {
            metrc_tag: None,
            ..req
        })
        .await
        .unwrap();
    assert_eq!(created.facility_id, FacilityId::new("fac_001"));
}
