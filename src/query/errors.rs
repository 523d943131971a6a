//! Translation errors
//!
//! Every variant is a client fault detected before storage is touched.

use thiserror::Error;

pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Search term absent or empty
    #[error("Query parameter required")]
    EmptySearchTerm,

    /// Search term could not be compiled into a predicate
    #[error("Search term rejected: {0}")]
    SearchTermRejected(String),

    /// Identifier is not in the store's external form
    #[error("Malformed id '{id}': {reason}")]
    MalformedId { id: String, reason: String },

    /// `space` missing or not a non-negative integer
    #[error("Invalid space: {0}")]
    InvalidSpace(String),
}
