use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque identifier of a backend record.
///
/// The backend is inconsistent about identifiers: some records carry `id`,
/// others `_id`, and `_id` may be a string, a number or an object such as
/// `{"$oid": "..."}`. Everything is reduced to a string here, once, while
/// decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

pub type ProductId = RecordId;
pub type UserId = RecordId;
pub type CartItemId = RecordId;

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Picks `id` over `_id` and converts whichever is present.
    pub fn normalize(id: Option<&Value>, legacy_id: Option<&Value>) -> Result<Self, String> {
        let raw = id
            .filter(|value| !value.is_null())
            .or(legacy_id.filter(|value| !value.is_null()))
            .ok_or_else(|| "record has neither `id` nor `_id`".to_string())?;

        id_from_value(raw)
            .filter(|id| !id.is_empty())
            .map(Self)
            .ok_or_else(|| format!("unsupported identifier: {raw}"))
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        Value::Object(fields) => {
            if let Some(Value::String(oid)) = fields.get("$oid") {
                return Some(oid.clone());
            }
            let mut strings = fields.values().filter_map(Value::as_str);
            match (strings.next(), strings.next()) {
                (Some(only), None) => Some(only.to_string()),
                _ => None,
            }
        }
        _ => None,
    }
}
