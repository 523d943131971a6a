//! Persistent file backend
//!
//! Layout: `<root>/<database>/<collection>.log`, one append-only record log
//! per collection. Logs are replayed into memory on open; reads are served
//! from memory and writes are fsynced before they become visible.
//!
//! Each collection has its own writer lock, held for the whole
//! prepare/append/apply sequence, so writes to a collection are serialized.
//! The document map is write-locked only to apply an already durable change;
//! readers never wait on a disk sync.

use std::collections::HashMap;
use std::fs;
use std::future::ready;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use serde_json::Value;

use super::backend::{BoxFuture, CollectionData, DocumentBackend};
use super::document::{DocumentId, UpdateResult};
use super::errors::{StorageError, StorageResult};
use super::filter::Predicate;
use super::mutation::Mutation;
use super::reader::LogReader;
use super::record::LogRecord;
use super::writer::LogWriter;

const LOG_EXTENSION: &str = "log";

/// Names become file names, so keep them to a safe alphabet.
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

struct FileCollection {
    data: RwLock<CollectionData>,
    writer: Mutex<LogWriter>,
}

impl FileCollection {
    fn new(data: CollectionData, writer: LogWriter) -> Arc<Self> {
        Arc::new(Self {
            data: RwLock::new(data),
            writer: Mutex::new(writer),
        })
    }
}

struct FileInner {
    dir: PathBuf,
    collections: RwLock<HashMap<String, Arc<FileCollection>>>,
}

/// Durable document backend
pub struct FileBackend {
    inner: Arc<FileInner>,
}

impl FileBackend {
    /// Open (creating if needed) `<root>/<database>` and replay every collection log.
    ///
    /// Any checksum failure or truncated record aborts the open.
    pub fn open(root: &Path, database: &str) -> StorageResult<Self> {
        if !is_valid_name(database) {
            return Err(StorageError::invalid_name("database", database));
        }

        let dir = root.join(database);
        fs::create_dir_all(&dir).map_err(|e| {
            StorageError::io_error(
                format!("Failed to create database directory: {}", dir.display()),
                e,
            )
        })?;

        let entries = fs::read_dir(&dir).map_err(|e| {
            StorageError::read_failed(
                format!("Failed to list database directory: {}", dir.display()),
                e,
            )
        })?;

        let mut collections = HashMap::new();
        for entry in entries {
            let path = entry
                .map_err(|e| StorageError::read_failed("Failed to read directory entry", e))?
                .path();

            if path.extension().and_then(|e| e.to_str()) != Some(LOG_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_valid_name(name) {
                continue;
            }

            let data = replay(&path, name)?;
            let writer = LogWriter::open(&path)?;
            collections.insert(name.to_string(), FileCollection::new(data, writer));
        }

        Ok(Self {
            inner: Arc::new(FileInner {
                dir,
                collections: RwLock::new(collections),
            }),
        })
    }

    fn find_sync(&self, collection: &str, predicate: &Predicate) -> StorageResult<Vec<Value>> {
        match self.inner.existing(collection)? {
            Some(target) => Ok(target.data.read().map_err(poisoned)?.find(predicate)),
            None => Ok(Vec::new()),
        }
    }

    fn count_sync(&self, collection: &str) -> StorageResult<usize> {
        match self.inner.existing(collection)? {
            Some(target) => Ok(target.data.read().map_err(poisoned)?.len()),
            None => Ok(0),
        }
    }

    /// Run blocking log I/O off the async workers.
    fn blocking<'a, T, F>(&'a self, f: F) -> BoxFuture<'a, StorageResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(&FileInner) -> StorageResult<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            tokio::task::spawn_blocking(move || f(&inner))
                .await
                .map_err(|e| StorageError::io_error_no_source(format!("Storage task failed: {}", e)))?
        })
    }
}

fn replay(path: &Path, collection: &str) -> StorageResult<CollectionData> {
    let mut data = CollectionData::default();
    let mut reader = LogReader::open(path)?;

    loop {
        let offset = reader.current_offset();
        let Some(record) = reader.read_next()? else {
            break;
        };

        if record.collection != collection {
            return Err(StorageError::corruption_at_offset(
                offset,
                format!(
                    "Record for collection '{}' found in {}",
                    record.collection,
                    path.display()
                ),
            ));
        }

        let id = DocumentId::parse(&record.document_id).map_err(|e| {
            StorageError::corruption_at_offset(offset, format!("Invalid document id: {}", e))
        })?;
        let document = record.document().map_err(|e| {
            StorageError::corruption_at_offset(offset, format!("Invalid document body: {}", e))
        })?;

        data.put(id, document);
    }

    Ok(data)
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::io_error_no_source(format!("Collection lock poisoned: {}", e))
}

fn encode(collection: &str, id: DocumentId, document: &Value) -> StorageResult<LogRecord> {
    LogRecord::from_document(collection, &id.to_string(), document).map_err(|e| {
        StorageError::invalid_document(format!("Document could not be serialized: {}", e))
    })
}

impl FileInner {
    fn existing(&self, collection: &str) -> StorageResult<Option<Arc<FileCollection>>> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections.get(collection).cloned())
    }

    /// The collection, creating its log on first use.
    fn open_collection(&self, collection: &str) -> StorageResult<Arc<FileCollection>> {
        if let Some(target) = self.existing(collection)? {
            return Ok(target);
        }

        let mut collections = self.collections.write().map_err(poisoned)?;
        if let Some(target) = collections.get(collection) {
            return Ok(Arc::clone(target));
        }

        let path = self.dir.join(format!("{}.{}", collection, LOG_EXTENSION));
        let target = FileCollection::new(CollectionData::default(), LogWriter::open(&path)?);
        collections.insert(collection.to_string(), Arc::clone(&target));
        Ok(target)
    }

    fn insert(&self, collection: &str, document: Value) -> StorageResult<DocumentId> {
        if !is_valid_name(collection) {
            return Err(StorageError::invalid_name("collection", collection));
        }

        let target = self.open_collection(collection)?;
        let mut writer = target.writer.lock().map_err(poisoned)?;

        let (id, document) = target
            .data
            .read()
            .map_err(poisoned)?
            .prepare_insert(collection, document)?;
        writer.append(&encode(collection, id, &document)?)?;
        target.data.write().map_err(poisoned)?.put(id, document);
        Ok(id)
    }

    fn update(&self, collection: &str, mutation: &Mutation) -> StorageResult<UpdateResult> {
        let Some(target) = self.existing(collection)? else {
            return Ok(UpdateResult::unmatched());
        };
        let mut writer = target.writer.lock().map_err(poisoned)?;

        let prepared = target.data.read().map_err(poisoned)?.prepare_update(mutation)?;
        let Some(prepared) = prepared else {
            return Ok(UpdateResult::unmatched());
        };

        if prepared.modified {
            writer.append(&encode(collection, prepared.id, &prepared.document)?)?;
            target
                .data
                .write()
                .map_err(poisoned)?
                .put(prepared.id, prepared.document);
        }
        Ok(UpdateResult::matched(prepared.modified))
    }
}

impl DocumentBackend for FileBackend {
    fn kind(&self) -> &'static str {
        "file"
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
        let collection = collection.to_string();
        self.blocking(move |inner| inner.insert(&collection, document))
    }

    fn update_one<'a>(
        &'a self,
        collection: &'a str,
        mutation: &'a Mutation,
    ) -> BoxFuture<'a, StorageResult<UpdateResult>> {
        let collection = collection.to_string();
        let mutation = mutation.clone();
        self.blocking(move |inner| inner.update(&collection, &mutation))
    }

    fn count<'a>(&'a self, collection: &'a str) -> BoxFuture<'a, StorageResult<usize>> {
        Box::pin(ready(self.count_sync(collection)))
    }
}
