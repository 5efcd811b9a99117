use serde::Serialize;
use tracing::{info, instrument};

use crate::api::ApiClient;
use crate::error::{StoreClientError, ValidationError};
use crate::id::{CartItemId, ProductId, UserId};
use crate::model::CartItem;
use crate::session::Session;

const CART: &str = "carrinho";

#[derive(Debug, Serialize)]
struct AddToCartRequest<'a> {
    #[serde(rename = "produtoId")]
    product_id: &'a ProductId,
    #[serde(rename = "quantidade")]
    quantity: u32,
    #[serde(rename = "usuarioId")]
    user_id: &'a UserId,
}

/// Cart operations for the user in the given session.
///
/// The client never patches cart state locally; callers re-fetch after each
/// mutation and show whatever the server holds.
#[derive(Debug, Clone)]
pub struct CartClient {
    api: ApiClient,
}

impl CartClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self, session))]
    pub async fn fetch(&self, session: &Session) -> Result<Vec<CartItem>, StoreClientError> {
        let user_id = session.user_id()?;
        let url = self.api.endpoint(&[CART])?;
        let request = self
            .api
            .get(url)
            .query(&[("usuarioId", user_id.as_str())]);
        ApiClient::send(request).await
    }

    #[instrument(skip(self, session), fields(product_id = %product_id))]
    pub async fn add(
        &self,
        session: &Session,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<CartItem, StoreClientError> {
        let user_id = session.user_id()?;
        if quantity == 0 {
            return Err(ValidationError::ZeroQuantity.into());
        }

        let url = self.api.endpoint(&[CART])?;
        let body = AddToCartRequest {
            product_id,
            quantity,
            user_id,
        };
        let item: CartItem = ApiClient::send(self.api.post(url).json(&body)).await?;
        info!(item_id = %item.id, quantity, "added to cart");
        Ok(item)
    }

    #[instrument(skip(self, session), fields(item_id = %item_id))]
    pub async fn remove(
        &self,
        session: &Session,
        item_id: &CartItemId,
    ) -> Result<(), StoreClientError> {
        let user_id = session.user_id()?;
        let url = self
            .api
            .endpoint(&[CART, user_id.as_str(), "itens", item_id.as_str()])?;
        ApiClient::send_empty(self.api.delete(url)).await?;
        info!("removed from cart");
        Ok(())
    }
}
