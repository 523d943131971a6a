//! In-memory backend
//!
//! Volatile; used for `memory://` targets and tests.

use std::collections::HashMap;
use std::future::ready;
use std::sync::RwLock;

use serde_json::Value;

use super::backend::{BoxFuture, CollectionData, DocumentBackend};
use super::document::{DocumentId, UpdateResult};
use super::errors::{StorageError, StorageResult};
use super::filter::Predicate;
use super::mutation::Mutation;

/// Volatile document backend
#[derive(Default)]
pub struct MemoryBackend {
    collections: RwLock<HashMap<String, CollectionData>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_sync(&self, collection: &str, predicate: &Predicate) -> StorageResult<Vec<Value>> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections
            .get(collection)
            .map(|c| c.find(predicate))
            .unwrap_or_default())
    }

    fn insert_sync(&self, collection: &str, document: Value) -> StorageResult<DocumentId> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        let data = collections.entry(collection.to_string()).or_default();

        let (id, document) = data.prepare_insert(collection, document)?;
        data.put(id, document);
        Ok(id)
    }

    fn update_sync(&self, collection: &str, mutation: &Mutation) -> StorageResult<UpdateResult> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        let Some(data) = collections.get_mut(collection) else {
            return Ok(UpdateResult::unmatched());
        };

        match data.prepare_update(mutation)? {
            None => Ok(UpdateResult::unmatched()),
            Some(prepared) => {
                let modified = prepared.modified;
                if modified {
                    data.put(prepared.id, prepared.document);
                }
                Ok(UpdateResult::matched(modified))
            }
        }
    }

    fn count_sync(&self, collection: &str) -> StorageResult<usize> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections.get(collection).map(CollectionData::len).unwrap_or(0))
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::io_error_no_source(format!("Collection lock poisoned: {}", e))
}

impl DocumentBackend for MemoryBackend {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn find<'a>(
        &'a self,
        collection: &'a str,
        predicate: &'a Predicate,
    ) -> BoxFuture<'a, StorageResult<Vec<Value>>> {
        Box::pin(ready(self.find_sync(collection, predicate)))
    }

    fn insert_one<'a>(
        &'a self,
        collection: &'a str,
        document: Value,
    ) -> BoxFuture<'a, StorageResult<DocumentId>> {
        Box::pin(ready(self.insert_sync(collection, document)))
    }

    fn update_one<'a>(
        &'a self,
        collection: &'a str,
        mutation: &'a Mutation,
    ) -> BoxFuture<'a, StorageResult<UpdateResult>> {
        Box::pin(ready(self.update_sync(collection, mutation)))
    }

    fn count<'a>(&'a self, collection: &'a str) -> BoxFuture<'a, StorageResult<usize>> {
        Box::pin(ready(self.count_sync(collection)))
    }
}
