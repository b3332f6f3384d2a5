//! In-memory storage backend using DashMap.
//!
//! Holds the seeded dashboard data plus the token tables. Access tokens
//! expire after [`StubConfig::token_ttl`]; refresh tokens are single-use and
//! rotate on every refresh.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{TimeZone, Utc};
use cultivate_core::{
    AlertId, AlertSeverity, ComplianceAlert, Facility, FacilityId, InventoryItem, ItemId,
    LicenseType, ProductCategory, TokenPair, User, UserId, UserRole,
};
use dashmap::DashMap;
use uuid::Uuid;

/// Default access-token lifetime.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 900;

/// Demo account seeded into every fresh store.
pub const DEMO_EMAIL: &str = "demo@cultivateco.com";
pub const DEMO_PASSWORD: &str = "cultivate-demo";

/// Stub server settings.
#[derive(Debug, Clone)]
pub struct StubConfig {
    pub port: u16,
    pub token_ttl: Duration,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            token_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
        }
    }
}

impl StubConfig {
    /// Variables:
    /// - `CULTIVATE_STUB_PORT` (default: 3001)
    /// - `CULTIVATE_STUB_TOKEN_TTL_SECS` (default: 900)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: std::env::var("CULTIVATE_STUB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            token_ttl: std::env::var("CULTIVATE_STUB_TOKEN_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.token_ttl),
        }
    }
}

struct Account {
    password: String,
    user: User,
}

struct AccessGrant {
    email: String,
    expires_at: Instant,
}

/// Inner storage holding all DashMaps.
struct Inner {
    token_ttl: Duration,
    accounts: DashMap<String, Account>,
    access_tokens: DashMap<String, AccessGrant>,
    refresh_tokens: DashMap<String, String>,
    facilities: DashMap<FacilityId, Facility>,
    alerts: DashMap<AlertId, ComplianceAlert>,
    inventory: DashMap<ItemId, InventoryItem>,
}

/// Shared application state holding all in-memory stores.
///
/// Cheaply cloneable via `Arc`: all clones share the same data.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(&StubConfig::default())
    }

    pub fn with_config(config: &StubConfig) -> Self {
        let state = Self {
            inner: Arc::new(Inner {
                token_ttl: config.token_ttl,
                accounts: DashMap::new(),
                access_tokens: DashMap::new(),
                refresh_tokens: DashMap::new(),
                facilities: DashMap::new(),
                alerts: DashMap::new(),
                inventory: DashMap::new(),
            }),
        };
        state.seed();
        state
    }

    pub fn facilities(&self) -> &DashMap<FacilityId, Facility> {
        &self.inner.facilities
    }

    pub fn alerts(&self) -> &DashMap<AlertId, ComplianceAlert> {
        &self.inner.alerts
    }

    pub fn inventory(&self) -> &DashMap<ItemId, InventoryItem> {
        &self.inner.inventory
    }

    // -- Tokens ---------------------------------------------------------------

    /// Check credentials and issue a fresh pair.
    pub fn login(&self, email: &str, password: &str) -> Option<(TokenPair, User)> {
        let key = email.trim().to_ascii_lowercase();
        let user = {
            let account = self.inner.accounts.get(&key)?;
            if account.password != password {
                return None;
            }
            account.user.clone()
        };
        Some((self.issue(&key), user))
    }

    /// Exchange a refresh token for a new pair. The old refresh token is
    /// consumed.
    pub fn rotate(&self, refresh_token: &str) -> Option<TokenPair> {
        let (_, email) = self.inner.refresh_tokens.remove(refresh_token)?;
        Some(self.issue(&email))
    }

    /// The user owning a live access token.
    pub fn authenticate(&self, access_token: &str) -> Option<User> {
        let email = {
            let grant = self.inner.access_tokens.get(access_token)?;
            if grant.expires_at <= Instant::now() {
                None
            } else {
                Some(grant.email.clone())
            }
        };
        let Some(email) = email else {
            self.inner.access_tokens.remove(access_token);
            return None;
        };
        self.inner.accounts.get(&email).map(|a| a.user.clone())
    }

    /// Revoke an access token and every refresh token of the same user.
    pub fn revoke(&self, access_token: &str) {
        if let Some((_, grant)) = self.inner.access_tokens.remove(access_token) {
            self.inner.refresh_tokens.retain(|_, email| *email != grant.email);
        }
    }

    /// Force an access token to expire now.
    pub fn expire(&self, access_token: &str) {
        if let Some(mut grant) = self.inner.access_tokens.get_mut(access_token) {
            grant.expires_at = Instant::now();
        }
    }

    fn issue(&self, email: &str) -> TokenPair {
        let pair = TokenPair {
            token: format!("at_{}", Uuid::new_v4().simple()),
            refresh_token: format!("rt_{}", Uuid::new_v4().simple()),
        };
        self.inner.access_tokens.insert(
            pair.token.clone(),
            AccessGrant {
                email: email.to_string(),
                expires_at: Instant::now() + self.inner.token_ttl,
            },
        );
        self.inner
            .refresh_tokens
            .insert(pair.refresh_token.clone(), email.to_string());
        pair
    }

    // -- Seed data ------------------------------------------------------------

    fn seed(&self) {
        let fac_cultivation = FacilityId::new("fac_001");
        let fac_retail = FacilityId::new("fac_002");

        self.inner.accounts.insert(
            DEMO_EMAIL.to_string(),
            Account {
                password: DEMO_PASSWORD.to_string(),
                user: User {
                    id: UserId::new("usr_demo"),
                    email: DEMO_EMAIL.to_string(),
                    first_name: "Jordan".into(),
                    last_name: "Reyes".into(),
                    role: UserRole::Admin,
                    facility_id: Some(fac_cultivation.clone()),
                    organization_name: Some("Green Valley Cannabis Co.".into()),
                },
            },
        );

        for facility in [
            Facility {
                id: fac_cultivation.clone(),
                name: "Green Valley Cultivation".into(),
                license_number: "CCL21-0001234".into(),
                license_type: LicenseType::Cultivation,
                state: "CA".into(),
                city: "Sacramento".into(),
                active: true,
            },
            Facility {
                id: fac_retail.clone(),
                name: "Green Valley Dispensary".into(),
                license_number: "C10-0000456-LIC".into(),
                license_type: LicenseType::Retail,
                state: "CA".into(),
                city: "Oakland".into(),
                active: true,
            },
        ] {
            self.inner.facilities.insert(facility.id.clone(), facility);
        }

        let seeded_at = Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).single().unwrap_or_else(Utc::now);
        for (id, facility, severity, title, description) in [
            (
                "alt_001",
                &fac_cultivation,
                AlertSeverity::High,
                "METRC manifest discrepancy",
                "Transfer manifest 0004417 lists 12 packages; 11 were received.",
            ),
            (
                "alt_002",
                &fac_cultivation,
                AlertSeverity::Medium,
                "Waste log overdue",
                "Plant waste log has not been updated in 5 days.",
            ),
            (
                "alt_003",
                &fac_retail,
                AlertSeverity::Low,
                "Camera retention check",
                "Confirm 90-day surveillance retention on camera 7.",
            ),
        ] {
            self.inner.alerts.insert(
                AlertId::new(id),
                ComplianceAlert {
                    id: AlertId::new(id),
                    facility_id: facility.clone(),
                    severity,
                    title: title.into(),
                    description: description.into(),
                    created_at: seeded_at,
                    acknowledged: false,
                    acknowledged_at: None,
                },
            );
        }

        for (id, facility, name, category, sku, quantity, unit, thc, tag) in [
            ("inv_001", &fac_cultivation, "Blue Dream Flower", ProductCategory::Flower, "BD-FLW-1LB", 24u32, "lb", Some(21.4), Some("1A4FF0100000022000000123")),
            ("inv_002", &fac_cultivation, "OG Kush Clones", ProductCategory::Other, "OGK-CLN", 150, "each", None, None),
            ("inv_003", &fac_retail, "Sour Diesel Pre-Roll 1g", ProductCategory::PreRoll, "SD-PR-1G", 320, "each", Some(19.8), Some("1A4FF0100000022000000456")),
            ("inv_004", &fac_retail, "Mango Gummies 100mg", ProductCategory::Edible, "MG-GUM-100", 85, "each", None, Some("1A4FF0100000022000000789")),
        ] {
            self.inner.inventory.insert(
                ItemId::new(id),
                InventoryItem {
                    id: ItemId::new(id),
                    facility_id: facility.clone(),
                    name: name.into(),
                    category,
                    sku: sku.into(),
                    quantity,
                    unit: unit.into(),
                    thc_percent: thc,
                    metrc_tag: tag.map(String::from),
                    updated_at: seeded_at,
                },
            );
        }
    }
}
