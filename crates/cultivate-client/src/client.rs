//! # Request Pipeline
//!
//! [`ApiClient`] is the single authenticated request surface. Every call:
//!
//! 1. attaches `Authorization: Bearer <token>`, `X-Facility-ID`, and
//!    `X-Request-Time` when the session has them;
//! 2. maps transport failures to [`ApiError::Network`] and non-2xx statuses
//!    to [`ApiError::Status`] with an [`ErrorCategory`](cultivate_core::ErrorCategory);
//! 3. on a 401 with a refresh token available, refreshes once and retries the
//!    original request once with the new token.
//!
//! ## Refresh
//!
//! Refreshes are serialized through the session's refresh gate. A task that
//! got a 401 with token `T` takes the gate and then looks at the session:
//!
//! - token still `T`: this task calls `POST /auth/refresh`;
//! - token changed: another task already refreshed, retry with the new one;
//! - token gone: another task's refresh failed, the session is expired.
//!
//! A failed refresh clears all stored credentials and surfaces
//! [`ApiError::SessionExpired`]. A 401 on the retried request is returned
//! as-is; it never starts a second refresh.

use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use cultivate_core::{headers, RefreshRequest, TokenPair};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;
use zeroize::Zeroizing;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::Session;

/// Path of the token refresh endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Authenticated HTTP client. Cheap to clone; clones share the session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<Session>,
}

impl ApiClient {
    /// Create a client bound to `session`.
    pub fn new(config: &ClientConfig, session: Arc<Session>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .map_err(|e| ApiError::Network {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issue a request and decode the JSON response into `T`.
    ///
    /// `body` is sent as JSON; `params` become the query string. An empty
    /// success body decodes as JSON `null`, so `T = ()` works for 204.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        params: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let endpoint = format!("{method} {path}");
        let url = self.url_for(path)?;
        let token = self.session.access_token();

        let first = self
            .dispatch(&method, &url, &endpoint, body, params, token.as_deref().map(String::as_str))
            .await;

        match first {
            Err(err) if err.is_unauthorized() && self.session.has_refresh_token() => {
                let fresh = match self.refresh_after(token.as_deref().map(String::as_str)).await {
                    Ok(fresh) => fresh,
                    Err(refresh_err) => {
                        tracing::warn!(%endpoint, "token refresh failed: {refresh_err}");
                        return Err(err.into_session_expired());
                    }
                };
                tracing::debug!(%endpoint, "retrying after token refresh");
                self.dispatch(&method, &url, &endpoint, body, params, Some(fresh.as_str()))
                    .await
            }
            other => other,
        }
    }

    /// `GET path`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None, &[]).await
    }

    /// `GET path?params`.
    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        self.request(Method::GET, path, None, params).await
    }

    /// `POST path` with a JSON body.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode(&Method::POST, path, body)?;
        self.request(Method::POST, path, Some(&body), &[]).await
    }

    /// `PUT path` with a JSON body.
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode(&Method::PUT, path, body)?;
        self.request(Method::PUT, path, Some(&body), &[]).await
    }

    /// `PATCH path` with a JSON body.
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode(&Method::PATCH, path, body)?;
        self.request(Method::PATCH, path, Some(&body), &[]).await
    }

    /// `DELETE path`.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::DELETE, path, None, &[]).await
    }

    /// Join `path` onto the base URL, keeping the base URL's own path prefix.
    pub(crate) fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| ApiError::InvalidPath {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Single `POST` without a bearer token and without the 401 handling.
    /// For the endpoints that establish a session: their 401 means bad
    /// credentials, never an expired token.
    pub(crate) async fn post_anonymous<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let endpoint = format!("POST {path}");
        let url = self.url_for(path)?;
        let body = encode(&Method::POST, path, body)?;
        self.dispatch(&Method::POST, &url, &endpoint, Some(&body), &[], None)
            .await
    }

    /// One attempt: send, classify, decode. Never refreshes.
    async fn dispatch<T: DeserializeOwned>(
        &self,
        method: &Method,
        url: &Url,
        endpoint: &str,
        body: Option<&Value>,
        params: &[(&str, &str)],
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let mut req = self
            .http
            .request(method.clone(), url.clone())
            .headers(self.context_headers(token));
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| ApiError::Network {
            endpoint: endpoint.to_string(),
            source: e,
        })?;
        let status = resp.status();
        tracing::debug!(%endpoint, status = status.as_u16(), "api response");

        let bytes = resp.bytes().await.map_err(|e| ApiError::Network {
            endpoint: endpoint.to_string(),
            source: e,
        })?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes);
            return Err(ApiError::from_response(endpoint, status.as_u16(), &text));
        }

        decode(endpoint, &bytes)
    }

    /// Authorization, facility, and timestamp headers for one attempt.
    fn context_headers(&self, token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => tracing::warn!("access token contains invalid header characters; sending without it"),
            }
        }
        if let Some(facility) = self.session.facility_id() {
            match HeaderValue::from_str(facility.as_str()) {
                Ok(value) => {
                    headers.insert(HeaderName::from_static(headers::FACILITY_ID), value);
                }
                Err(_) => tracing::warn!(%facility, "facility id is not a valid header value; omitting"),
            }
        }
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        if let Ok(value) = HeaderValue::from_str(&now) {
            headers.insert(HeaderName::from_static(headers::REQUEST_TIME), value);
        }
        headers
    }

    /// Obtain a token newer than `stale`, refreshing at most once across all
    /// concurrent callers.
    async fn refresh_after(&self, stale: Option<&str>) -> Result<Zeroizing<String>, ApiError> {
        let _gate = self.session.refresh_gate().lock().await;

        let current = self.session.access_token();
        if current.as_deref().map(String::as_str) != stale {
            return current.ok_or_else(|| ApiError::SessionExpired {
                endpoint: REFRESH_PATH.to_string(),
                message: "session was cleared by a concurrent refresh".to_string(),
            });
        }

        let Some(refresh_token) = self.session.refresh_token() else {
            return Err(ApiError::SessionExpired {
                endpoint: REFRESH_PATH.to_string(),
                message: "no refresh token".to_string(),
            });
        };

        match self.call_refresh(&refresh_token).await {
            Ok(pair) => {
                tracing::info!("access token refreshed");
                if let Err(e) = self.session.replace_tokens(&pair) {
                    tracing::warn!("refreshed tokens could not be persisted: {e}");
                }
                Ok(Zeroizing::new(pair.token))
            }
            Err(e) => {
                if let Err(clear_err) = self.session.clear() {
                    tracing::warn!("failed to clear credentials after refresh failure: {clear_err}");
                }
                Err(e)
            }
        }
    }

    /// `POST /auth/refresh`. Bypasses the 401 handling: never retried.
    async fn call_refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.post_anonymous(REFRESH_PATH, &body).await
    }
}

/// `prefix/{id}` with `id` percent-encoded as exactly one path segment, so
/// `/`, `?`, `#` and `%` in an id cannot reach another endpoint.
pub(crate) fn resource_path(prefix: &str, id: &str) -> Result<String, ApiError> {
    let invalid = |reason: String| ApiError::InvalidPath {
        path: format!("{prefix}/{id}"),
        reason,
    };
    if id.is_empty() || id == "." || id == ".." {
        return Err(invalid(format!("{id:?} is not a usable resource id")));
    }
    let mut scratch = Url::parse("http://localhost/").map_err(|e| invalid(e.to_string()))?;
    scratch
        .path_segments_mut()
        .map_err(|()| invalid("cannot encode path segment".to_string()))?
        .pop_if_empty()
        .push(id);
    Ok(format!("{}{}", prefix.trim_end_matches('/'), scratch.path()))
}

fn encode<B: Serialize + ?Sized>(method: &Method, path: &str, body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|source| ApiError::Encode {
        endpoint: format!("{method} {path}"),
        source,
    })
}

fn decode<T: DeserializeOwned>(endpoint: &str, bytes: &[u8]) -> Result<T, ApiError> {
    let result = if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_slice(b"null")
    } else {
        serde_json::from_slice(bytes)
    };
    result.map_err(|source| ApiError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn client(base: &str) -> ApiClient {
        let config = ClientConfig::new(base).unwrap();
        let session = Arc::new(Session::empty(Arc::new(MemoryStore::new())));
        ApiClient::new(&config, session).unwrap()
    }

    #[test]
    fn url_for_keeps_base_path_prefix() {
        let c = client("http://127.0.0.1:3001/api");
        assert_eq!(
            c.url_for("/auth/refresh").unwrap().as_str(),
            "http://127.0.0.1:3001/api/auth/refresh"
        );
        let c = client("http://127.0.0.1:3001/api/");
        assert_eq!(
            c.url_for("facilities").unwrap().as_str(),
            "http://127.0.0.1:3001/api/facilities"
        );
    }

    #[test]
    fn resource_path_encodes_id_as_one_segment() {
        assert_eq!(resource_path("/inventory", "inv_1").unwrap(), "/inventory/inv_1");
        assert_eq!(
            resource_path("/inventory", "../auth/me").unwrap(),
            "/inventory/..%2Fauth%2Fme"
        );
        assert_eq!(
            resource_path("/inventory", "inv_1?x=1#frag").unwrap(),
            "/inventory/inv_1%3Fx=1%23frag"
        );
        assert_eq!(resource_path("/inventory", "%2e%2e").unwrap(), "/inventory/%252e%252e");

        let c = client("http://127.0.0.1:3001/api");
        let url = c.url_for(&resource_path("/inventory", "../auth/me").unwrap()).unwrap();
        assert_eq!(url.path(), "/api/inventory/..%2Fauth%2Fme");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn resource_path_rejects_dot_segments() {
        for id in ["", ".", ".."] {
            let err = resource_path("/facilities", id).unwrap_err();
            assert!(matches!(err, ApiError::InvalidPath { .. }), "id {id:?}");
        }
    }

    #[test]
    fn decode_treats_empty_body_as_null() {
        let unit: () = decode("DELETE /x", b"").unwrap();
        assert_eq!(unit, ());
        let none: Option<u32> = decode("GET /x", b"  ").unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn decode_failure_is_generic() {
        let err = decode::<u32>("GET /x", b"{\"a\":1}").unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
        assert_eq!(err.category(), cultivate_core::ErrorCategory::Generic);
    }

    #[test]
    fn context_headers_without_session_only_timestamp() {
        let c = client("http://127.0.0.1:3001/api");
        let headers = c.context_headers(None);
        assert!(headers.get(AUTHORIZATION).is_none());
        assert!(headers.get(headers::FACILITY_ID).is_none());
        let stamp = headers.get(headers::REQUEST_TIME).unwrap().to_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
        assert!(stamp.ends_with('Z'));
    }

    #[test]
    fn context_headers_carry_bearer_token() {
        let c = client("http://127.0.0.1:3001/api");
        let headers = c.context_headers(Some("abc"));
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
    }
}
