//! Order documents

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::CatalogError;
use crate::storage::ID_FIELD;

/// One entry of an order's `lessons` list.
///
/// The storefront sends either bare lesson ids or `{id, quantity}` objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderLine {
    Id(String),
    Entry {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        quantity: Option<u32>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl OrderLine {
    pub fn lesson_id(&self) -> &str {
        match self {
            OrderLine::Id(id) => id,
            OrderLine::Entry { id, .. } => id,
        }
    }

    fn quantity(&self) -> Option<u32> {
        match self {
            OrderLine::Id(_) => None,
            OrderLine::Entry { quantity, .. } => *quantity,
        }
    }
}

/// A purchase order as submitted by the storefront
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub lessons: Vec<OrderLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// Decode and validate a request body. The body itself is what gets stored.
    pub fn from_value(value: &Value) -> Result<Self, CatalogError> {
        if !value.is_object() {
            return Err(CatalogError::InvalidOrder("order must be a JSON object".into()));
        }
        let order =
            Order::deserialize(value).map_err(|e| CatalogError::InvalidOrder(e.to_string()))?;
        order.validate()?;
        Ok(order)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::InvalidOrder("name must not be empty".into()));
        }
        if self.lessons.is_empty() {
            return Err(CatalogError::InvalidOrder(
                "lessons must list at least one lesson".into(),
            ));
        }
        if self.lessons.iter().any(|l| l.lesson_id().trim().is_empty()) {
            return Err(CatalogError::InvalidOrder("lesson ids must not be empty".into()));
        }
        let quantities = self
            .lessons
            .iter()
            .filter_map(OrderLine::quantity)
            .chain(self.quantity);
        for quantity in quantities {
            if quantity == 0 {
                return Err(CatalogError::InvalidOrder("quantity must be at least 1".into()));
            }
        }
        if self.extra.contains_key(ID_FIELD) {
            return Err(CatalogError::InvalidOrder("_id is assigned by the store".into()));
        }
        Ok(())
    }
}
