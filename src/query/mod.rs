//! # Request translation
//!
//! Turns the inputs of search and update requests into store-level
//! [`Predicate`](crate::storage::Predicate)s and
//! [`Mutation`](crate::storage::Mutation)s. Translation is pure; nothing here
//! touches storage.

mod errors;
pub mod search;
pub mod update;

pub use errors::{QueryError, QueryResult};
pub use search::{translate_search, SEARCH_FIELDS};
pub use update::{parse_document_id, parse_space, translate_space_update};
