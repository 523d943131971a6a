//! Storage handle and collection references
//!
//! `connect` runs once during boot. The resulting [`StorageHandle`] is cheap
//! to clone and is shared by every request handler.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use super::backend::DocumentBackend;
use super::document::{DocumentId, InsertOneResult, UpdateResult};
use super::errors::{StorageError, StorageResult};
use super::file::{is_valid_name, FileBackend};
use super::filter::Predicate;
use super::memory::MemoryBackend;
use super::mutation::Mutation;

/// Collection holding the lesson catalog
pub const LESSONS_COLLECTION: &str = "lessons";

/// Collection holding purchase orders
pub const ORDERS_COLLECTION: &str = "orders";

const MEMORY_SCHEME: &str = "memory://";
const FILE_SCHEME: &str = "file://";

/// Where the document database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    /// `memory://`
    Memory,
    /// `file://<dir>` or a bare directory path
    File(PathBuf),
}

impl ConnectionTarget {
    pub fn parse(target: &str) -> StorageResult<Self> {
        if target == MEMORY_SCHEME {
            return Ok(ConnectionTarget::Memory);
        }
        if let Some(path) = target.strip_prefix(FILE_SCHEME) {
            if path.is_empty() {
                return Err(StorageError::unsupported_target(target));
            }
            return Ok(ConnectionTarget::File(PathBuf::from(path)));
        }
        if target.is_empty() || target.contains("://") {
            return Err(StorageError::unsupported_target(target));
        }
        Ok(ConnectionTarget::File(PathBuf::from(target)))
    }
}

/// Connect to `database` at `target`.
///
/// Opening a file target replays its collection logs; a failure here is
/// startup-fatal for the caller.
pub async fn connect(target: &str, database: &str) -> StorageResult<StorageHandle> {
    if !is_valid_name(database) {
        return Err(StorageError::invalid_name("database", database));
    }

    let backend: Arc<dyn DocumentBackend> = match ConnectionTarget::parse(target)? {
        ConnectionTarget::Memory => Arc::new(MemoryBackend::new()),
        ConnectionTarget::File(root) => {
            let database = database.to_string();
            let backend = tokio::task::spawn_blocking(move || FileBackend::open(&root, &database))
                .await
                .map_err(|e| {
                    StorageError::io_error_no_source(format!("Storage open task failed: {}", e))
                })??;
            Arc::new(backend)
        }
    };

    Ok(StorageHandle::with_backend(database, backend))
}

/// A live connection to one document database
#[derive(Clone)]
pub struct StorageHandle {
    database: Arc<str>,
    backend: Arc<dyn DocumentBackend>,
}

impl StorageHandle {
    pub fn with_backend(database: &str, backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            database: Arc::from(database),
            backend,
        }
    }

    /// A fresh volatile database
    pub fn in_memory(database: &str) -> Self {
        Self::with_backend(database, Arc::new(MemoryBackend::new()))
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn backend_kind(&self) -> &'static str {
        self.backend.kind()
    }

    pub fn collection(&self, name: &str) -> Collection {
        Collection {
            name: name.to_string(),
            backend: Arc::clone(&self.backend),
        }
    }

    pub fn lessons(&self) -> Collection {
        self.collection(LESSONS_COLLECTION)
    }

    pub fn orders(&self) -> Collection {
        self.collection(ORDERS_COLLECTION)
    }
}

impl fmt::Debug for StorageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageHandle")
            .field("database", &self.database)
            .field("backend", &self.backend.kind())
            .finish()
    }
}

/// Reference to a named collection
#[derive(Clone)]
pub struct Collection {
    name: String,
    backend: Arc<dyn DocumentBackend>,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn find(&self, predicate: &Predicate) -> StorageResult<Vec<Value>> {
        self.backend.find(&self.name, predicate).await
    }

    pub async fn find_all(&self) -> StorageResult<Vec<Value>> {
        self.find(&Predicate::All).await
    }

    pub async fn find_by_id(&self, id: DocumentId) -> StorageResult<Option<Value>> {
        Ok(self
            .find(&Predicate::id_equals(id))
            .await?
            .into_iter()
            .next())
    }

    pub async fn insert_one(&self, document: Value) -> StorageResult<InsertOneResult> {
        let inserted_id = self.backend.insert_one(&self.name, document).await?;
        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id,
        })
    }

    /// Insert documents one at a time; stops at the first failure.
    pub async fn insert_many(&self, documents: Vec<Value>) -> StorageResult<Vec<DocumentId>> {
        let mut ids = Vec::with_capacity(documents.len());
        for document in documents {
            ids.push(self.backend.insert_one(&self.name, document).await?);
        }
        Ok(ids)
    }

    pub async fn update_one(&self, mutation: &Mutation) -> StorageResult<UpdateResult> {
        self.backend.update_one(&self.name, mutation).await
    }

    pub async fn count(&self) -> StorageResult<usize> {
        self.backend.count(&self.name).await
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("backend", &self.backend.kind())
            .finish()
    }
}
