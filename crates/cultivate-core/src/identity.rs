//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers that travel between the dashboard,
//! the client, and the backend. You cannot pass an `AlertId` where a
//! `FacilityId` is expected.
//!
//! Identifiers are opaque strings issued by the backend (`fac_001`,
//! `usr_demo`, ...), so the newtypes wrap `String` rather than `Uuid`.

use serde::{Deserialize, Serialize};

/// Identifier of a facility: one physical, licensed business location.
///
/// Sent on every request as the tenant-scoping header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(pub String);

/// Identifier of a dashboard user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

/// Identifier of a compliance alert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(pub String);

/// Identifier of an inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            /// Wrap an identifier string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(FacilityId);
string_id!(UserId);
string_id!(AlertId);
string_id!(ItemId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_strings() {
        let id = FacilityId::new("fac_001");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""fac_001""#);
        let back: FacilityId = serde_json::from_str(r#""fac_001""#).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn display_is_the_raw_identifier() {
        assert_eq!(AlertId::from("alt_7").to_string(), "alt_7");
        assert_eq!(ItemId::new(String::from("inv_1")).as_str(), "inv_1");
    }
}
