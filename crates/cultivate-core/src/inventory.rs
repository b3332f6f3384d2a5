//! Inventory items tracked per facility.
//!
//! `metrc_tag` is the state traceability package tag. A tag identifies one
//! physical package and may be assigned to at most one item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{FacilityId, ItemId};

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Flower,
    PreRoll,
    Edible,
    Concentrate,
    Vape,
    Topical,
    Tincture,
    #[serde(other)]
    Other,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 8] = [
        Self::Flower,
        Self::PreRoll,
        Self::Edible,
        Self::Concentrate,
        Self::Vape,
        Self::Topical,
        Self::Tincture,
        Self::Other,
    ];

    /// Wire name, as used in the `category` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flower => "flower",
            Self::PreRoll => "pre_roll",
            Self::Edible => "edible",
            Self::Concentrate => "concentrate",
            Self::Vape => "vape",
            Self::Topical => "topical",
            Self::Tincture => "tincture",
            Self::Other => "other",
        }
    }
}

/// Strict parse of a user-supplied category. Unlike wire decoding, an
/// unrecognized name is an error rather than [`ProductCategory::Other`].
impl std::str::FromStr for ProductCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown product category {s:?} (expected one of: {})", known.join(", "))
            })
    }
}

/// A stocked product at one facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: ItemId,
    pub facility_id: FacilityId,
    pub name: String,
    pub category: ProductCategory,
    pub sku: String,
    pub quantity: u32,
    /// Unit of `quantity`: `g`, `each`, `ml`.
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thc_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrc_tag: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// `POST /inventory` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryItem {
    pub name: String,
    pub category: ProductCategory,
    pub sku: String,
    pub quantity: u32,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thc_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrc_tag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Flower".parse::<ProductCategory>().unwrap(), ProductCategory::Flower);
        assert_eq!("pre_roll".parse::<ProductCategory>().unwrap(), ProductCategory::PreRoll);
    }

    #[test]
    fn unrecognized_category_is_rejected_when_parsed() {
        let err = "seeds".parse::<ProductCategory>().unwrap_err();
        assert!(err.contains("seeds"));
        assert!(err.contains("pre_roll"));
        assert_eq!("pre-roll".parse::<ProductCategory>().unwrap(), ProductCategory::PreRoll);
        assert_eq!("other".parse::<ProductCategory>().unwrap(), ProductCategory::Other);
    }

    #[test]
    fn unrecognized_category_on_the_wire_decodes_as_other() {
        let category: ProductCategory = serde_json::from_str("\"seeds\"").unwrap();
        assert_eq!(category, ProductCategory::Other);
    }

    #[test]
    fn create_request_omits_absent_optionals() {
        let req = CreateInventoryItem {
            name: "Blue Dream 3.5g".into(),
            category: ProductCategory::Flower,
            sku: "BD-35".into(),
            quantity: 40,
            unit: "each".into(),
            thc_percent: None,
            metrc_tag: None,
        };
        let body = serde_json::to_value(&req).unwrap();
        assert!(body.get("thcPercent").is_none());
        assert!(body.get("metrcTag").is_none());
        assert_eq!(body["category"], "flower");
    }
}
