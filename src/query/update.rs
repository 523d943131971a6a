//! Space update translation

use serde_json::Value;

use crate::catalog::SPACE_FIELD;
use crate::storage::{DocumentId, Mutation, Predicate};

use super::errors::{QueryError, QueryResult};

/// Parse an identifier supplied by a caller.
pub fn parse_document_id(id: &str) -> QueryResult<DocumentId> {
    DocumentId::parse(id).map_err(|e| QueryError::MalformedId {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

/// Read `space` from an update body as a non-negative integer.
///
/// Whole-valued floats (`4.0`) are accepted and normalised to integers.
pub fn parse_space(body: &Value) -> QueryResult<u64> {
    let value = body
        .as_object()
        .ok_or_else(|| QueryError::InvalidSpace("body must be a JSON object".into()))?
        .get(SPACE_FIELD)
        .ok_or_else(|| QueryError::InvalidSpace("space is required".into()))?;

    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        _ => Err(QueryError::InvalidSpace(format!(
            "space must be a non-negative integer, got {}",
            value
        ))),
    }
}

/// Build the mutation setting one lesson's `space`.
///
/// The id is validated before the body, so a malformed id reports as such
/// regardless of the body.
pub fn translate_space_update(id: &str, body: &Value) -> QueryResult<Mutation> {
    let id = parse_document_id(id)?;
    let space = parse_space(body)?;
    Ok(Mutation::set(
        Predicate::id_equals(id),
        SPACE_FIELD,
        Value::from(space),
    ))
}
