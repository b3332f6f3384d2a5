//! Licensed facilities.

use serde::{Deserialize, Serialize};

use crate::identity::FacilityId;

/// State license class held by a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseType {
    Cultivation,
    Manufacturing,
    Retail,
    Distribution,
    Testing,
    Microbusiness,
    #[serde(other)]
    Unknown,
}

/// One physical business location operating under a state license.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    pub license_number: String,
    pub license_type: LicenseType,
    /// Two-letter US state code.
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}
