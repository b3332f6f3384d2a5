//! # Compliance Status and Alerts
//!
//! A facility's compliance score starts at 100 and loses a fixed penalty for
//! every unacknowledged alert, by severity. The level is a pure function of
//! the score.
//!
//! | Severity | Penalty |
//! |----------|---------|
//! | low      | 2       |
//! | medium   | 5       |
//! | high     | 10      |
//! | critical | 25      |
//!
//! | Score    | Level       |
//! |----------|-------------|
//! | ≥ 90     | `compliant` |
//! | ≥ 70     | `warning`   |
//! | < 70     | `violation` |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{AlertId, FacilityId};

/// Severity of a compliance alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    /// Score points an open alert of this severity costs.
    pub fn penalty(&self) -> u8 {
        match self {
            Self::Low => 2,
            Self::Medium => 5,
            Self::High => 10,
            Self::Critical => 25,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Overall compliance standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceLevel {
    Compliant,
    Warning,
    Violation,
    #[serde(other)]
    Unknown,
}

impl ComplianceLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Self::Compliant,
            70..=89 => Self::Warning,
            _ => Self::Violation,
        }
    }
}

/// A compliance alert raised against a facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceAlert {
    pub id: AlertId,
    pub facility_id: FacilityId,
    pub severity: AlertSeverity,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<DateTime<Utc>>,
}

/// Compliance summary for one facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceStatus {
    pub facility_id: FacilityId,
    /// 0..=100.
    pub score: u8,
    pub level: ComplianceLevel,
    #[serde(default)]
    pub open_alerts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_audit_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_audit_at: Option<DateTime<Utc>>,
}

impl ComplianceStatus {
    /// Compute a facility's status from its alerts. Acknowledged alerts cost
    /// nothing; alerts for other facilities are ignored.
    pub fn evaluate<'a>(
        facility_id: &FacilityId,
        alerts: impl IntoIterator<Item = &'a ComplianceAlert>,
    ) -> Self {
        let mut penalty: u32 = 0;
        let mut open_alerts = 0;
        for alert in alerts {
            if &alert.facility_id != facility_id || alert.acknowledged {
                continue;
            }
            penalty += u32::from(alert.severity.penalty());
            open_alerts += 1;
        }
        let score = 100u32.saturating_sub(penalty) as u8;
        Self {
            facility_id: facility_id.clone(),
            score,
            level: ComplianceLevel::from_score(score),
            open_alerts,
            last_audit_at: None,
            next_audit_at: None,
        }
    }
}
