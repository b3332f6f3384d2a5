//! Typed client for the compliance API.
//!
//! Status and alerts are scoped to the facility sent in `X-Facility-ID`,
//! which comes from the stored user.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/compliance/status` | Score and level for the current facility |
//! | GET    | `/compliance/alerts` | Alerts, filterable by severity/acknowledged |
//! | POST   | `/compliance/alerts/{id}/acknowledge` | Acknowledge an alert |

use cultivate_core::{AlertId, AlertSeverity, ComplianceAlert, ComplianceStatus};

use crate::client::{resource_path, ApiClient};
use crate::error::ApiError;

/// Query filter for [`ComplianceClient::alerts`].
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub severity: Option<AlertSeverity>,
    pub acknowledged: Option<bool>,
}

impl AlertFilter {
    /// Only alerts nobody has acknowledged yet.
    pub fn open() -> Self {
        Self {
            severity: None,
            acknowledged: Some(false),
        }
    }
}

/// Client for the compliance API.
#[derive(Debug, Clone)]
pub struct ComplianceClient {
    api: ApiClient,
}

impl ComplianceClient {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn status(&self) -> Result<ComplianceStatus, ApiError> {
        self.api.get("/compliance/status").await
    }

    pub async fn alerts(&self, filter: &AlertFilter) -> Result<Vec<ComplianceAlert>, ApiError> {
        let acknowledged = filter.acknowledged.map(|a| a.to_string());
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(severity) = filter.severity {
            params.push(("severity", severity.as_str()));
        }
        if let Some(ack) = acknowledged.as_deref() {
            params.push(("acknowledged", ack));
        }
        self.api.get_with("/compliance/alerts", &params).await
    }

    /// Acknowledge an alert. Acknowledging twice is a 409 from the server.
    pub async fn acknowledge(&self, id: &AlertId) -> Result<ComplianceAlert, ApiError> {
        let alert = resource_path("/compliance/alerts", id.as_str())?;
        self.api
            .post(&format!("{alert}/acknowledge"), &serde_json::json!({}))
            .await
    }
}
