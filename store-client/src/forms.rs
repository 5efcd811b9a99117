//! Form input as typed by the user, validated before anything hits the
//! network.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ValidationError;

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("email", &self.email)?;
        require("password", &self.password)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        require("password", &self.password)?;
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub image_url: String,
    pub description: String,
}

impl ProductForm {
    /// An unparseable price becomes zero; a negative one is rejected.
    pub fn validate(&self) -> Result<ProductDraft, ValidationError> {
        require("name", &self.name)?;
        require("price", &self.price)?;
        require("image URL", &self.image_url)?;
        require("description", &self.description)?;

        let price = parse_price(&self.price);
        if price.is_sign_negative() && !price.is_zero() {
            return Err(ValidationError::NegativePrice);
        }

        Ok(ProductDraft {
            name: self.name.trim().to_string(),
            price,
            image_url: self.image_url.trim().to_string(),
            description: self.description.trim().to_string(),
        })
    }
}

/// A validated product, in the shape the backend expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDraft {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "preco", serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    #[serde(rename = "urlfoto")]
    pub image_url: String,
    #[serde(rename = "descricao")]
    pub description: String,
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

// Accepts both "10.50" and "10,50".
fn parse_price(input: &str) -> Decimal {
    let normalized = input.trim().replace(',', ".");
    Decimal::from_str(&normalized).unwrap_or(Decimal::ZERO)
}
