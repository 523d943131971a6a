//! Field-level update mutations

use serde_json::{Map, Value};

use super::document::ID_FIELD;
use super::errors::{StorageError, StorageResult};
use super::filter::Predicate;

/// Sets fields on the first document matching `filter`.
///
/// Fields not named in the set are left untouched; the document is never replaced.
#[derive(Debug, Clone)]
pub struct Mutation {
    filter: Predicate,
    set: Map<String, Value>,
}

impl Mutation {
    /// A mutation setting a single field
    pub fn set(filter: Predicate, field: impl Into<String>, value: Value) -> Self {
        let mut set = Map::new();
        set.insert(field.into(), value);
        Self { filter, set }
    }

    pub fn filter(&self) -> &Predicate {
        &self.filter
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.set
    }

    /// Apply the field set to `doc`. Returns whether any value changed.
    pub fn apply(&self, doc: &mut Value) -> StorageResult<bool> {
        if self.set.contains_key(ID_FIELD) {
            return Err(StorageError::invalid_document("_id cannot be modified"));
        }

        let obj = doc
            .as_object_mut()
            .ok_or_else(|| StorageError::invalid_document("Stored document is not an object"))?;

        let mut changed = false;
        for (field, value) in &self.set {
            if obj.get(field) != Some(value) {
                obj.insert(field.clone(), value.clone());
                changed = true;
            }
        }
        Ok(changed)
    }
}
