//! Document storage subsystem
//!
//! Holds the one connection to the document database and exposes named
//! collections over it.
//!
//! # Backends
//!
//! - `memory://`: volatile, in-process
//! - `file://<dir>`: append-only, checksum-verified collection logs,
//!   replayed on connect; the latest record for a document id wins
//!
//! Collection operations are asynchronous. Store-level predicates and
//! mutations live in [`filter`] and [`mutation`]; building them from
//! requests is the job of [`crate::query`].

mod backend;
mod checksum;
mod document;
mod errors;
mod file;
pub mod filter;
mod handle;
mod memory;
pub mod mutation;
mod reader;
mod record;
mod writer;

pub use backend::{BoxFuture, CollectionData, DocumentBackend, PreparedUpdate};
pub use checksum::compute_checksum;
pub use document::{DocumentId, InsertOneResult, UpdateResult, ID_FIELD};
pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use file::FileBackend;
pub use filter::Predicate;
pub use handle::{
    connect, Collection, ConnectionTarget, StorageHandle, LESSONS_COLLECTION, ORDERS_COLLECTION,
};
pub use memory::MemoryBackend;
pub use mutation::Mutation;
pub use reader::LogReader;
pub use record::LogRecord;
pub use writer::LogWriter;
