//! # Store-level predicates
//!
//! The filter language collections understand. Translators in
//! [`crate::query`] build these; backends only evaluate them.

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use super::document::DocumentId;

/// A predicate over stored documents
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Matches every document
    All,

    /// Matches the document whose `_id` equals the identifier
    IdEquals(DocumentId),

    /// Matches when the string field satisfies the pattern.
    /// Missing and non-string fields never match.
    FieldMatches { field: String, pattern: Regex },

    /// Matches when any branch matches
    AnyOf(Vec<Predicate>),
}

impl Predicate {
    pub fn id_equals(id: DocumentId) -> Self {
        Predicate::IdEquals(id)
    }

    /// Unanchored, case-insensitive containment of `needle` in `field`.
    ///
    /// `needle` is escaped, so metacharacters match themselves.
    pub fn contains_ignore_case(
        field: impl Into<String>,
        needle: &str,
    ) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(&regex::escape(needle))
            .case_insensitive(true)
            .build()?;

        Ok(Predicate::FieldMatches {
            field: field.into(),
            pattern,
        })
    }

    pub fn any_of(branches: Vec<Predicate>) -> Self {
        Predicate::AnyOf(branches)
    }

    /// Check if a document matches this predicate
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Predicate::All => true,
            Predicate::IdEquals(id) => DocumentId::of(doc).as_ref() == Some(id),
            Predicate::FieldMatches { field, pattern } => doc
                .get(field)
                .and_then(Value::as_str)
                .map(|s| pattern.is_match(s))
                .unwrap_or(false),
            Predicate::AnyOf(branches) => branches.iter().any(|p| p.matches(doc)),
        }
    }
}
