//! Document identifiers and write acknowledgements

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Name of the identifier field carried by every stored document.
pub const ID_FIELD: &str = "_id";

/// Opaque, store-generated document identifier.
///
/// Serialized as the hyphenated lowercase UUID text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the external string form.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    /// Read the `_id` of a stored document, if it has a well-formed one.
    pub fn of(document: &Value) -> Option<Self> {
        document
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .and_then(|s| Self::parse(s).ok())
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Acknowledgement for a single-document insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: DocumentId,
}

/// Outcome of a single-document update.
///
/// `matched_count == 0` means no document satisfied the filter;
/// `modified_count == 0` with a match means the values were already in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateResult {
    pub fn unmatched() -> Self {
        Self::default()
    }

    pub fn matched(modified: bool) -> Self {
        Self {
            matched_count: 1,
            modified_count: u64::from(modified),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_accepts_canonical_and_uppercase() {
        let id = DocumentId::generate();
        let upper = id.to_string().to_uppercase();
        assert_eq!(DocumentId::parse(&upper).unwrap(), id);
        assert_eq!(id.to_string(), id.to_string().to_lowercase());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(DocumentId::parse("not-an-id").is_err());
        assert!("".parse::<DocumentId>().is_err());
    }

    #[test]
    fn test_of_reads_id_field() {
        let id = DocumentId::generate();
        assert_eq!(DocumentId::of(&json!({"_id": id.to_string()})), Some(id));
        assert_eq!(DocumentId::of(&json!({"_id": 7})), None);
        assert_eq!(DocumentId::of(&json!({"topic": "Math"})), None);
    }

    #[test]
    fn test_insert_result_wire_shape() {
        let id = DocumentId::generate();
        let value = serde_json::to_value(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
        .unwrap();
        assert_eq!(value, json!({"acknowledged": true, "insertedId": id.to_string()}));
    }
}
