use tracing::{info, instrument};

use crate::api::ApiClient;
use crate::error::StoreClientError;
use crate::forms::ProductDraft;
use crate::model::Product;

const PRODUCTS: &str = "produtos";

/// Reads and extends the product catalog. Every call is a full fetch.
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    api: ApiClient,
}

impl CatalogLoader {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Products in the order the server returned them.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, StoreClientError> {
        let url = self.api.endpoint(&[PRODUCTS])?;
        ApiClient::send(self.api.get(url)).await
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, StoreClientError> {
        let url = self.api.endpoint(&[PRODUCTS])?;
        let product: Product = ApiClient::send(self.api.post(url).json(draft)).await?;
        info!(product_id = %product.id, "product created");
        Ok(product)
    }
}
