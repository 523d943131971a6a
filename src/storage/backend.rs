//! Backend trait and the in-memory collection state backends share

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use super::document::{DocumentId, UpdateResult, ID_FIELD};
use super::errors::{StorageError, StorageResult};
use super::filter::Predicate;
use super::mutation::Mutation;

/// Boxed future returned by backend operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A document database holding named collections.
///
/// Every operation is asynchronous; callers resume when that operation completes.
pub trait DocumentBackend: Send + Sync {
    /// Short name of the backend, used in logs
    fn kind(&self) -> &'static str;

    /// All documents of `collection` matching `predicate`, in insertion order
    fn find<'a>(
        &'a self,
        collection: &'a str,
        predicate: &'a Predicate,
    ) -> BoxFuture<'a, StorageResult<Vec<Value>>>;

    /// Store a new document, assigning `_id` when absent
    fn insert_one<'a>(
        &'a self,
        collection: &'a str,
        document: Value,
    ) -> BoxFuture<'a, StorageResult<DocumentId>>;

    /// Apply `mutation` to the first matching document
    fn update_one<'a>(
        &'a self,
        collection: &'a str,
        mutation: &'a Mutation,
    ) -> BoxFuture<'a, StorageResult<UpdateResult>>;

    /// Number of documents in `collection`
    fn count<'a>(&'a self, collection: &'a str) -> BoxFuture<'a, StorageResult<usize>>;
}

/// Documents of one collection in insertion order, indexed by `_id`.
#[derive(Debug, Default, Clone)]
pub struct CollectionData {
    documents: Vec<Value>,
    positions: HashMap<DocumentId, usize>,
}

/// An update ready to be persisted and then applied with [`CollectionData::put`].
#[derive(Debug)]
pub struct PreparedUpdate {
    pub id: DocumentId,
    pub document: Value,
    pub modified: bool,
}

impl CollectionData {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn find(&self, predicate: &Predicate) -> Vec<Value> {
        if let Predicate::IdEquals(id) = predicate {
            return self.get(id).cloned().into_iter().collect();
        }

        self.documents
            .iter()
            .filter(|doc| predicate.matches(doc))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &DocumentId) -> Option<&Value> {
        self.positions.get(id).and_then(|&i| self.documents.get(i))
    }

    /// Validate a new document and give it a canonical `_id`.
    pub fn prepare_insert(
        &self,
        collection: &str,
        mut document: Value,
    ) -> StorageResult<(DocumentId, Value)> {
        let obj = document
            .as_object_mut()
            .ok_or_else(|| StorageError::invalid_document("Document must be a JSON object"))?;

        let id = match obj.get(ID_FIELD) {
            None => DocumentId::generate(),
            Some(Value::String(s)) => DocumentId::parse(s).map_err(|e| {
                StorageError::invalid_document(format!("Invalid _id '{}': {}", s, e))
            })?,
            Some(other) => {
                return Err(StorageError::invalid_document(format!(
                    "_id must be a string, got {}",
                    other
                )))
            }
        };

        if self.positions.contains_key(&id) {
            return Err(StorageError::duplicate_key(collection, &id.to_string()));
        }

        obj.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        Ok((id, document))
    }

    /// Compute the result of `mutation` without touching stored state.
    ///
    /// `Ok(None)` when nothing matches.
    pub fn prepare_update(&self, mutation: &Mutation) -> StorageResult<Option<PreparedUpdate>> {
        let current = match mutation.filter() {
            Predicate::IdEquals(id) => self.get(id),
            filter => self.documents.iter().find(|doc| filter.matches(doc)),
        };

        let Some(current) = current else {
            return Ok(None);
        };

        let id = DocumentId::of(current).ok_or_else(|| {
            StorageError::data_corruption("Stored document has no valid _id")
        })?;
        let mut document = current.clone();
        let modified = mutation.apply(&mut document)?;

        Ok(Some(PreparedUpdate {
            id,
            document,
            modified,
        }))
    }

    /// Insert or replace the document stored under `id`. Replacement keeps its position.
    pub fn put(&mut self, id: DocumentId, document: Value) {
        match self.positions.get(&id) {
            Some(&i) => self.documents[i] = document,
            None => {
                self.positions.insert(id, self.documents.len());
                self.documents.push(document);
            }
        }
    }
}
