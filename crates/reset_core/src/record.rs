use rand::Rng;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::id::IdGenerator;

/// A document read from one line of a database file, paired with its
/// replacement identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub old_id: String,
    pub name: Option<String>,
    pub new_id: String,
}

impl Record {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Error)]
pub enum RecordParseError {
    #[error("error unmarshalling document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document has an empty _id")]
    EmptyId,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    name: Option<JsonValue>,
}

/// A decoded document that has not been given a replacement yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub old_id: String,
    pub name: Option<String>,
}

impl Document {
    /// Draws a replacement identifier for this document.
    ///
    /// Every existing identifier in the run should already be reserved in
    /// `ids`, so that a replacement never collides with an `_id` that is only
    /// read later.
    pub fn assign<R: Rng>(self, ids: &mut IdGenerator<R>) -> Record {
        ids.reserve(&self.old_id);
        let new_id = ids.generate();
        Record {
            old_id: self.old_id,
            name: self.name,
            new_id,
        }
    }
}

/// Decodes one document line into its `_id` and optional `name`.
pub fn decode_document(line: &[u8]) -> Result<Document, RecordParseError> {
    let raw: RawDocument = serde_json::from_slice(line)?;
    if raw.id.is_empty() {
        return Err(RecordParseError::EmptyId);
    }

    let name = match raw.name {
        Some(JsonValue::String(name)) => Some(name),
        _ => None,
    };

    Ok(Document { old_id: raw.id, name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::is_valid_id;

    #[test]
    fn extracts_id_and_name() {
        let doc = decode_document(br#"{"_id":"abc123", "name":"Hero", "hp": 7}"#)
            .expect("line should parse");

        assert_eq!(doc.old_id, "abc123");
        assert_eq!(doc.name.as_deref(), Some("Hero"));
    }

    #[test]
    fn name_is_optional_and_non_string_names_are_ignored() {
        let unnamed = decode_document(br#"{"_id":"a1"}"#).expect("no name");
        let numeric = decode_document(br#"{"_id":"a2","name":12}"#).expect("numeric name");

        assert_eq!(unnamed.name, None);
        assert_eq!(numeric.name, None);
    }

    #[test]
    fn rejects_malformed_and_idless_lines() {
        assert!(matches!(
            decode_document(b"{not json"),
            Err(RecordParseError::Json(_))
        ));
        assert!(matches!(
            decode_document(br#"{"name":"No Id"}"#),
            Err(RecordParseError::Json(_))
        ));
        assert!(matches!(
            decode_document(br#"{"_id":"","name":"Blank"}"#),
            Err(RecordParseError::EmptyId)
        ));
    }

    #[test]
    fn assign_skips_identifiers_reserved_ahead_of_time() {
        let first = IdGenerator::seeded(1).generate();

        let mut ids = IdGenerator::seeded(1);
        ids.reserve(&first);
        let doc = decode_document(br#"{"_id":"abc123","name":"Hero"}"#).expect("line should parse");
        let record = doc.assign(&mut ids);

        assert_eq!(record.old_id, "abc123");
        assert_eq!(record.display_name(), "Hero");
        assert!(is_valid_id(&record.new_id));
        assert_ne!(record.new_id, first);
        assert!(ids.is_taken("abc123"));
    }
}
