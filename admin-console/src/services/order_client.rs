use crate::models::{Order, Paginated};
use api_core::{ApiClient, ApiError};

/// Orders are read-only from the admin side.
#[derive(Clone)]
pub struct OrderClient {
    api: ApiClient,
}

impl OrderClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Pages are 1-based; `0` is treated as the first page.
    pub async fn list(&self, page: u32) -> Result<Paginated<Order>, ApiError> {
        self.api
            .get("orders", &[("page", page.max(1).to_string())])
            .await?
            .into_data("orders")
    }

    pub async fn get(&self, id: u64) -> Result<Order, ApiError> {
        self.api
            .get(&format!("orders/{}", id), &[])
            .await?
            .into_data("order")
    }
}
