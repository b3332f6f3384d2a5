//! Route definitions for the CultivateCo API stub.
//!
//! Implements the endpoints that `cultivate-client` calls, with responses
//! that deserialize cleanly into the `cultivate-core` types. Everything
//! except `/health`, login, and refresh requires a live bearer token.
//! Facility-scoped routes use `X-Facility-ID`, falling back to the user's
//! own facility.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use cultivate_core::{
    headers, AlertId, AlertSeverity, AuthResponse, ComplianceStatus, CreateInventoryItem,
    FacilityId, InventoryItem, ItemId, LoginRequest, ProductCategory, RefreshRequest, User,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::ValidatedJson;
use crate::store::AppState;

/// Build the complete router with all stub routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(health))
        // Auth
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        // Facilities
        .route("/api/facilities", get(facilities_list))
        .route("/api/facilities/:id", get(facility_get))
        // Compliance
        .route("/api/compliance/status", get(compliance_status))
        .route("/api/compliance/alerts", get(alerts_list))
        .route(
            "/api/compliance/alerts/:id/acknowledge",
            post(alert_acknowledge),
        )
        // Inventory
        .route("/api/inventory", get(inventory_list).post(inventory_create))
        .route("/api/inventory/:id", get(inventory_get))
        .fallback(not_found)
        .with_state(state)
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Resolve the bearer token to a user.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".into()))?;
    state
        .authenticate(token)
        .ok_or_else(|| AppError::Unauthorized("Access token is invalid or expired".into()))
}

/// Facility a request is scoped to: the header if present, else the user's.
fn facility_scope(headers: &HeaderMap, user: &User) -> Option<FacilityId> {
    headers
        .get(headers::FACILITY_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(FacilityId::new)
        .or_else(|| user.facility_id.clone())
}

// ── Health ──────────────────────────────────────────────────────────

async fn health() -> StatusCode {
    StatusCode::OK
}

// ── Auth ────────────────────────────────────────────────────────────

async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (pair, user) = state
        .login(&body.email, &body.password)
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;
    tracing::info!(user = %user.id, "login");
    Ok(Json(AuthResponse {
        token: pair.token,
        refresh_token: pair.refresh_token,
        user,
    }))
}

async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RefreshRequest>,
) -> Result<Response, AppError> {
    let pair = state
        .rotate(&body.refresh_token)
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".into()))?;
    tracing::info!("token refreshed");
    Ok(Json(pair).into_response())
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode, AppError> {
    authenticate(&state, &headers)?;
    if let Some(token) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        state.revoke(token);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<User>, AppError> {
    Ok(Json(authenticate(&state, &headers)?))
}

// ── Facilities ──────────────────────────────────────────────────────

async fn facilities_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    authenticate(&state, &headers)?;
    let mut facilities: Vec<_> = state
        .facilities()
        .iter()
        .map(|e| e.value().clone())
        .collect();
    facilities.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(Json(facilities).into_response())
}

async fn facility_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    authenticate(&state, &headers)?;
    match state.facilities().get(&FacilityId::new(id.clone())) {
        Some(entry) => Ok(Json(entry.value().clone()).into_response()),
        None => Err(AppError::NotFound(format!("Facility {id} not found"))),
    }
}

// ── Compliance ──────────────────────────────────────────────────────

async fn compliance_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ComplianceStatus>, AppError> {
    let user = authenticate(&state, &headers)?;
    let facility = facility_scope(&headers, &user)
        .ok_or_else(|| AppError::BadRequest("No facility selected".into()))?;
    if !state.facilities().contains_key(&facility) {
        return Err(AppError::NotFound(format!("Facility {facility} not found")));
    }
    let alerts: Vec<_> = state.alerts().iter().map(|e| e.value().clone()).collect();
    let mut status = ComplianceStatus::evaluate(&facility, &alerts);
    status.last_audit_at = Some(Utc::now() - chrono::Duration::days(41));
    status.next_audit_at = Some(Utc::now() + chrono::Duration::days(49));
    Ok(Json(status))
}

#[derive(Debug, Deserialize)]
struct AlertQuery {
    severity: Option<AlertSeverity>,
    acknowledged: Option<bool>,
}

async fn alerts_list(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let user = authenticate(&state, &headers)?;
    let facility = facility_scope(&headers, &user);
    let mut alerts: Vec<_> = state
        .alerts()
        .iter()
        .map(|e| e.value().clone())
        .filter(|a| facility.as_ref().map_or(true, |f| &a.facility_id == f))
        .filter(|a| query.severity.map_or(true, |s| a.severity == s))
        .filter(|a| query.acknowledged.map_or(true, |ack| a.acknowledged == ack))
        .collect();
    alerts.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.id.cmp(&b.id)));
    Ok(Json(alerts).into_response())
}

async fn alert_acknowledge(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    authenticate(&state, &headers)?;
    let mut entry = state
        .alerts()
        .get_mut(&AlertId::new(id.clone()))
        .ok_or_else(|| AppError::NotFound(format!("Alert {id} not found")))?;
    if entry.acknowledged {
        return Err(AppError::Conflict(format!("Alert {id} is already acknowledged")));
    }
    entry.acknowledged = true;
    entry.acknowledged_at = Some(Utc::now());
    Ok(Json(entry.value().clone()).into_response())
}

// ── Inventory ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct InventoryQuery {
    category: Option<ProductCategory>,
    search: Option<String>,
}

async fn inventory_list(
    State(state): State<AppState>,
    Query(query): Query<InventoryQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let user = authenticate(&state, &headers)?;
    let facility = facility_scope(&headers, &user);
    let needle = query.search.as_deref().map(str::to_lowercase);
    let mut items: Vec<InventoryItem> = state
        .inventory()
        .iter()
        .map(|e| e.value().clone())
        .filter(|i| facility.as_ref().map_or(true, |f| &i.facility_id == f))
        .filter(|i| query.category.map_or(true, |c| i.category == c))
        .filter(|i| {
            needle.as_deref().map_or(true, |n| {
                i.name.to_lowercase().contains(n) || i.sku.to_lowercase().contains(n)
            })
        })
        .collect();
    items.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(Json(items).into_response())
}

async fn inventory_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    authenticate(&state, &headers)?;
    match state.inventory().get(&ItemId::new(id.clone())) {
        Some(entry) => Ok(Json(entry.value().clone()).into_response()),
        None => Err(AppError::NotFound(format!("Inventory item {id} not found"))),
    }
}

async fn inventory_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<CreateInventoryItem>,
) -> Result<Response, AppError> {
    let user = authenticate(&state, &headers)?;
    let facility = facility_scope(&headers, &user)
        .ok_or_else(|| AppError::BadRequest("No facility selected".into()))?;

    if body.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }
    if body.sku.trim().is_empty() {
        return Err(AppError::Validation("sku is required".into()));
    }
    if body.quantity == 0 {
        return Err(AppError::Validation("quantity must be greater than zero".into()));
    }
    if let Some(tag) = body.metrc_tag.as_deref() {
        let taken = state
            .inventory()
            .iter()
            .any(|e| e.value().metrc_tag.as_deref() == Some(tag));
        if taken {
            return Err(AppError::Conflict(format!(
                "METRC tag {tag} is already assigned to another package"
            )));
        }
    }

    let item = InventoryItem {
        id: ItemId::new(format!("inv_{}", Uuid::new_v4().simple())),
        facility_id: facility,
        name: body.name,
        category: body.category,
        sku: body.sku,
        quantity: body.quantity,
        unit: body.unit,
        thc_percent: body.thc_percent,
        metrc_tag: body.metrc_tag,
        updated_at: Utc::now(),
    };
    state.inventory().insert(item.id.clone(), item.clone());
    Ok((StatusCode::CREATED, Json(item)).into_response())
}

async fn not_found() -> AppError {
    AppError::NotFound("No such endpoint".into())
}
