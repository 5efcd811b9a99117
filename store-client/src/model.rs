use chrono::{DateTime, Utc};
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::{CartItemId, ProductId, RecordId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(try_from = "RawUser")]
#[display("{name} <{email}>")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Display)]
#[serde(try_from = "RawProduct")]
#[display("[{id}] {name} - R$ {price:.2}")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawCartItem")]
pub struct CartItem {
    pub id: CartItemId,
    pub product: Product,
    pub quantity: u32,
    pub created_at: Option<DateTime<Utc>>,
}

impl CartItem {
    pub fn subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Sum of price × quantity over the cart.
pub fn cart_total(items: &[CartItem]) -> Decimal {
    items.iter().map(CartItem::subtotal).sum()
}

// Wire shapes. Identifier normalization happens in the TryFrom impls below,
// so nothing past this module ever sees `_id`.

#[derive(Deserialize)]
struct RawUser {
    id: Option<Value>,
    #[serde(rename = "_id")]
    legacy_id: Option<Value>,
    #[serde(rename = "nome", default)]
    name: String,
    #[serde(default)]
    email: String,
}

impl TryFrom<RawUser> for User {
    type Error = String;

    fn try_from(raw: RawUser) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RecordId::normalize(raw.id.as_ref(), raw.legacy_id.as_ref())?,
            name: raw.name,
            email: raw.email,
        })
    }
}

#[derive(Deserialize)]
struct RawProduct {
    id: Option<Value>,
    #[serde(rename = "_id")]
    legacy_id: Option<Value>,
    #[serde(rename = "nome", default)]
    name: String,
    #[serde(rename = "preco", default)]
    price: Decimal,
    #[serde(rename = "descricao", default)]
    description: String,
    #[serde(rename = "urlfoto", default)]
    image_url: String,
}

impl TryFrom<RawProduct> for Product {
    type Error = String;

    fn try_from(raw: RawProduct) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RecordId::normalize(raw.id.as_ref(), raw.legacy_id.as_ref())?,
            name: raw.name,
            price: raw.price,
            description: raw.description,
            image_url: raw.image_url,
        })
    }
}

#[derive(Deserialize)]
struct RawCartItem {
    id: Option<Value>,
    #[serde(rename = "_id")]
    legacy_id: Option<Value>,
    #[serde(rename = "produto")]
    product: Product,
    #[serde(rename = "quantidade", default = "default_quantity")]
    quantity: u32,
    #[serde(rename = "criadoEm", default)]
    created_at: Option<DateTime<Utc>>,
}

fn default_quantity() -> u32 {
    1
}

impl TryFrom<RawCartItem> for CartItem {
    type Error = String;

    fn try_from(raw: RawCartItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RecordId::normalize(raw.id.as_ref(), raw.legacy_id.as_ref())?,
            product: raw.product,
            quantity: raw.quantity,
            created_at: raw.created_at,
        })
    }
}
