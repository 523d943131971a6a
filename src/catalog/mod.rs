//! # Catalog documents
//!
//! Typed shapes for the two kinds of document the service stores. Inbound
//! payloads are validated against these before they reach storage.

pub mod lesson;
pub mod order;

use thiserror::Error;

pub use lesson::{Lesson, LOCATION_FIELD, SPACE_FIELD, TOPIC_FIELD};
pub use order::{Order, OrderLine};

/// Shape errors for catalog documents
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Invalid lesson: {0}")]
    InvalidLesson(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),
}
