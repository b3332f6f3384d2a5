//! Wire types for the `/auth/*` endpoints.
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | POST | `/auth/login` | [`LoginRequest`] | [`AuthResponse`] |
//! | POST | `/auth/refresh` | [`RefreshRequest`] | [`TokenPair`] |
//! | POST | `/auth/logout` | none | empty |
//! | GET  | `/auth/me` | none | [`User`] |
//!
//! Types that carry secrets implement `Debug` by hand and redact them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::{FacilityId, UserId};

/// Role of a dashboard user within their organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    Staff,
    Auditor,
    /// Forward-compatible catch-all for roles added server-side.
    #[serde(other)]
    Unknown,
}

/// Authenticated user as returned by login and `/auth/me`.
///
/// This is also the object persisted under the user storage key. The client
/// only consults it for the facility identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: UserRole,
    #[serde(default, alias = "facility_id", skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<FacilityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
}

impl User {
    /// "First Last", falling back to the email address.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

/// `POST /auth/login` request body.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// `POST /auth/refresh` request body.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshRequest")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Access/refresh token pair, as returned by `POST /auth/refresh`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer credential.
    pub token: String,
    /// Longer-lived credential used to reissue `token`.
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// `POST /auth/login` response body: a token pair plus the user.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: User,
}

impl AuthResponse {
    /// Split off the token pair.
    pub fn tokens(&self) -> TokenPair {
        TokenPair {
            token: self.token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_accepts_snake_case_facility_alias() {
        let user: User = serde_json::from_str(
            r#"{"id":"usr_1","email":"a@b.co","role":"manager","facility_id":"fac_9"}"#,
        )
        .unwrap();
        assert_eq!(user.facility_id, Some(FacilityId::new("fac_9")));
        assert_eq!(user.role, UserRole::Manager);
    }

    #[test]
    fn unknown_role_maps_to_catch_all() {
        let user: User =
            serde_json::from_str(r#"{"id":"usr_1","email":"a@b.co","role":"budtender"}"#)
                .unwrap();
        assert_eq!(user.role, UserRole::Unknown);
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let mut user: User =
            serde_json::from_str(r#"{"id":"usr_1","email":"a@b.co","role":"staff"}"#).unwrap();
        assert_eq!(user.display_name(), "a@b.co");
        user.first_name = "Jordan".into();
        user.last_name = "Reyes".into();
        assert_eq!(user.display_name(), "Jordan Reyes");
    }

    #[test]
    fn refresh_request_uses_camel_case() {
        let body = serde_json::to_value(RefreshRequest {
            refresh_token: "r1".into(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"refreshToken": "r1"}));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let pair = TokenPair {
            token: "secret-access".into(),
            refresh_token: "secret-refresh".into(),
        };
        let login = LoginRequest {
            email: "a@b.co".into(),
            password: "hunter2".into(),
        };
        let rendered = format!("{pair:?} {login:?}");
        assert!(!rendered.contains("secret-access"));
        assert!(!rendered.contains("secret-refresh"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("a@b.co"));
    }
}
