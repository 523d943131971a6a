//! Lesson documents

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::CatalogError;
use crate::storage::DocumentId;

pub const TOPIC_FIELD: &str = "topic";
pub const LOCATION_FIELD: &str = "location";
pub const SPACE_FIELD: &str = "space";

/// A bookable lesson.
///
/// Fields beyond the typed ones (an image path, say) are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub topic: String,
    pub location: String,
    pub price: Number,
    /// Remaining capacity
    pub space: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Lesson {
    /// Decode and validate a lesson supplied from outside (seed files).
    pub fn from_value(value: Value) -> Result<Self, CatalogError> {
        let lesson: Lesson =
            serde_json::from_value(value).map_err(|e| CatalogError::InvalidLesson(e.to_string()))?;
        lesson.validate()?;
        Ok(lesson)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.topic.trim().is_empty() {
            return Err(CatalogError::InvalidLesson("topic must not be empty".into()));
        }
        if self.location.trim().is_empty() {
            return Err(CatalogError::InvalidLesson("location must not be empty".into()));
        }
        match self.price.as_f64() {
            Some(p) if p >= 0.0 => Ok(()),
            _ => Err(CatalogError::InvalidLesson(format!(
                "price must be a non-negative number, got {}",
                self.price
            ))),
        }
    }

    /// The document to hand to storage
    pub fn into_document(self) -> Result<Value, CatalogError> {
        serde_json::to_value(self).map_err(|e| CatalogError::InvalidLesson(e.to_string()))
    }

}
