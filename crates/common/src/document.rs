//! Collection documents and the `{ "collection": ... }` envelope
//!
//! The Postman import and update endpoints expect the collection wrapped in an
//! envelope object. Converter output is a bare collection, so documents are
//! normalized before they are sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// File name of the working artifact inside the working directory
pub const ARTIFACT_FILE_NAME: &str = "document-postman.json";

const ENVELOPE_KEY: &str = "collection";

/// Whether `document` already has the envelope shape
pub fn is_enveloped(document: &Value) -> bool {
    document
        .as_object()
        .is_some_and(|obj| obj.contains_key(ENVELOPE_KEY))
}

/// Wrap `document` in the envelope unless it is already wrapped
pub fn normalize(document: Value) -> Value {
    if is_enveloped(&document) {
        return document;
    }

    let mut envelope = Map::with_capacity(1);
    envelope.insert(ENVELOPE_KEY.to_string(), document);
    Value::Object(envelope)
}

/// Identifying fields of a collection as reported by the remote API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
}

impl CollectionSummary {
    /// Extract the summary from a response shaped `{"collection": {...}}`
    ///
    /// Fetch responses nest the metadata under `collection.info` with a
    /// `_postman_id` field; both shapes are accepted.
    pub fn from_response(response: &Value) -> Option<Self> {
        let collection = response.get(ENVELOPE_KEY)?;

        if let Ok(summary) = serde_json::from_value::<Self>(collection.clone()) {
            return Some(summary);
        }

        let info = collection.get("info")?;
        let id = info.get("_postman_id")?.as_str()?.to_string();
        Some(Self {
            id,
            name: info.get("name").and_then(Value::as_str).map(String::from),
            uid: info.get("uid").and_then(Value::as_str).map(String::from),
        })
    }
}
