//! Typed client for the inventory API.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/inventory`      | List items, filterable by category/search |
//! | GET    | `/inventory/{id}` | Get one item |
//! | POST   | `/inventory`      | Create an item |
//!
//! Creation surfaces 422 for invalid input and 409 when the METRC tag is
//! already assigned to another package.

use cultivate_core::{CreateInventoryItem, InventoryItem, ItemId, ProductCategory};

use crate::client::{resource_path, ApiClient};
use crate::error::ApiError;

/// Query filter for [`InventoryClient::list`].
#[derive(Debug, Clone, Default)]
pub struct InventoryFilter {
    pub category: Option<ProductCategory>,
    /// Case-insensitive substring match on name or SKU.
    pub search: Option<String>,
}

/// Client for the inventory API.
#[derive(Debug, Clone)]
pub struct InventoryClient {
    api: ApiClient,
}

impl InventoryClient {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, filter: &InventoryFilter) -> Result<Vec<InventoryItem>, ApiError> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(category) = filter.category {
            params.push(("category", category.as_str()));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(("search", search));
        }
        self.api.get_with("/inventory", &params).await
    }

    /// Get an item by id. `Ok(None)` on 404.
    pub async fn get(&self, id: &ItemId) -> Result<Option<InventoryItem>, ApiError> {
        let path = resource_path("/inventory", id.as_str())?;
        match self.api.get(&path).await {
            Ok(item) => Ok(Some(item)),
            Err(ApiError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn create(&self, req: &CreateInventoryItem) -> Result<InventoryItem, ApiError> {
        self.api.post("/inventory", req).await
    }
}
