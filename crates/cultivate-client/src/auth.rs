//! Login, logout, and current-user operations.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/auth/login`  | [`AuthClient::login`] |
//! | POST   | `/auth/logout` | [`AuthClient::logout`] |
//! | GET    | `/auth/me`     | [`AuthClient::current_user`] |

use cultivate_core::{AuthResponse, LoginRequest, User};
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiError;

/// Client for the `/auth` endpoints.
#[derive(Debug, Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Exchange credentials for a session. Stores the token pair and the
    /// user on success.
    ///
    /// A 401 here means bad credentials; it never triggers a refresh. A
    /// session already held is only replaced once the new one is issued.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: AuthResponse = self.api.post_anonymous("/auth/login", &req).await?;
        self.api.session().establish(&resp)?;
        tracing::info!(user = %resp.user.id, "logged in");
        Ok(resp.user)
    }

    /// End the session.
    ///
    /// The server call is best-effort: its failure is logged and ignored.
    /// The three stored values are cleared in every case; only a storage
    /// failure while clearing is returned.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if self.api.session().is_authenticated() {
            let result: Result<Value, ApiError> = self
                .api
                .request(reqwest::Method::POST, "/auth/logout", None, &[])
                .await;
            if let Err(e) = result {
                tracing::warn!(category = %e.category(), "logout call failed, clearing local session anyway: {e}");
            }
        }
        self.api.session().clear()?;
        tracing::info!("logged out");
        Ok(())
    }

    /// Fetch the authenticated user and refresh the stored copy.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let user: User = self.api.get("/auth/me").await?;
        self.api.session().set_user(&user)?;
        Ok(user)
    }

    /// Whether an access token is held.
    pub fn is_authenticated(&self) -> bool {
        self.api.session().is_authenticated()
    }
}
