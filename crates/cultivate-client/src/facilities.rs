//! Typed client for the facilities API.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/facilities`      | List facilities visible to the user |
//! | GET    | `/facilities/{id}` | Get one facility |

use cultivate_core::{Facility, FacilityId};

use crate::client::{resource_path, ApiClient};
use crate::error::ApiError;

/// Client for the facilities API.
#[derive(Debug, Clone)]
pub struct FacilityClient {
    api: ApiClient,
}

impl FacilityClient {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Facility>, ApiError> {
        self.api.get("/facilities").await
    }

    /// Get a facility by id. `Ok(None)` on 404.
    pub async fn get(&self, id: &FacilityId) -> Result<Option<Facility>, ApiError> {
        let path = resource_path("/facilities", id.as_str())?;
        match self.api.get(&path).await {
            Ok(facility) => Ok(Some(facility)),
            Err(ApiError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
