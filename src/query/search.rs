//! Search term to predicate translation

use crate::catalog::{LOCATION_FIELD, TOPIC_FIELD};
use crate::storage::Predicate;

use super::errors::{QueryError, QueryResult};

/// Fields a search term is matched against
pub const SEARCH_FIELDS: [&str; 2] = [TOPIC_FIELD, LOCATION_FIELD];

/// Build the lesson search predicate for `term`.
///
/// Matches lessons whose topic or location contains the term, ignoring case.
/// The term is used as given (no trimming) and always matched literally.
pub fn translate_search(term: Option<&str>) -> QueryResult<Predicate> {
    let term = match term {
        Some(t) if !t.is_empty() => t,
        _ => return Err(QueryError::EmptySearchTerm),
    };

    let branches = SEARCH_FIELDS
        .iter()
        .map(|field| {
            Predicate::contains_ignore_case(*field, term)
                .map_err(|e| QueryError::SearchTermRejected(e.to_string()))
        })
        .collect::<QueryResult<Vec<_>>>()?;

    Ok(Predicate::any_of(branches))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lesson(topic: &str, location: &str) -> serde_json::Value {
        json!({"topic": topic, "location": location, "price": 100, "space": 5})
    }

    #[test]
    fn test_missing_or_empty_term() {
        assert_eq!(translate_search(None).unwrap_err(), QueryError::EmptySearchTerm);
        assert_eq!(
            translate_search(Some("")).unwrap_err(),
            QueryError::EmptySearchTerm
        );
    }

    #[test]
    fn test_matches_topic_or_location_ignoring_case() {
        let p = translate_search(Some("math")).unwrap();

        assert!(p.matches(&lesson("Mathematics", "Hendon")));
        assert!(p.matches(&lesson("Science", "Math Lab")));
        assert!(!p.matches(&lesson("Chemistry", "Colindale")));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let p = translate_search(Some("C++")).unwrap();
        assert!(p.matches(&lesson("Intro to c++", "Online")));
        assert!(!p.matches(&lesson("C", "Online")));

        let dot = translate_search(Some(".")).unwrap();
        assert!(!dot.matches(&lesson("Art", "Hendon")));
    }

    #[test]
    fn test_term_is_not_trimmed() {
        let p = translate_search(Some(" lab")).unwrap();
        assert!(p.matches(&lesson("Art", "Math lab")));
        assert!(!p.matches(&lesson("Art", "Laboratory")));
    }

    #[test]
    fn test_non_string_fields_never_match() {
        let p = translate_search(Some("5")).unwrap();
        assert!(!p.matches(&json!({"topic": 5, "location": null})));
    }
}
