use serde::de::DeserializeOwned;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::firestore::error::{decode_error, FirestoreResult};
use crate::firestore::remote::serializer::decode_fields;

/// A decoded document: its fields as native JSON plus the injected `id`,
/// `createTime` and `updateTime` keys.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    fields: JsonMap<String, JsonValue>,
}

impl Document {
    pub fn new(fields: JsonMap<String, JsonValue>) -> Self {
        Self { fields }
    }

    /// Returns the document id, i.e. the last segment of its resource name.
    pub fn id(&self) -> &str {
        self.fields
            .get("id")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
    }

    pub fn create_time(&self) -> Option<&str> {
        self.fields.get("createTime").and_then(JsonValue::as_str)
    }

    pub fn update_time(&self) -> Option<&str> {
        self.fields.get("updateTime").and_then(JsonValue::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.fields.get(field)
    }

    pub fn data(&self) -> &JsonMap<String, JsonValue> {
        &self.fields
    }

    pub fn into_data(self) -> JsonMap<String, JsonValue> {
        self.fields
    }

    /// Deserializes the document (injected keys included) into a user type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> FirestoreResult<T> {
        serde_json::from_value(JsonValue::Object(self.fields.clone()))
            .map_err(|err| decode_error(format!("Failed to deserialize document: {err}")))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DecodedResponse {
    Document(Document),
    Documents(Vec<Document>),
}

impl DecodedResponse {
    /// Flattens either shape into a list.
    pub fn into_documents(self) -> Vec<Document> {
        match self {
            DecodedResponse::Document(document) => vec![document],
            DecodedResponse::Documents(documents) => documents,
        }
    }
}

/// Decodes one wire document (`{name, fields, createTime, updateTime}`).
pub fn decode_document(document: &JsonValue) -> FirestoreResult<Document> {
    let name = document
        .get("name")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| decode_error("Document is missing its 'name'"))?;
    let id = name.rsplit('/').next().unwrap_or(name);

    let mut fields = match document.get("fields") {
        Some(fields) => decode_fields(fields)?,
        None => JsonMap::new(),
    };
    fields.insert("id".to_string(), JsonValue::String(id.to_string()));
    for key in ["createTime", "updateTime"] {
        if let Some(time) = document.get(key).filter(|value| !value.is_null()) {
            fields.insert(key.to_string(), time.clone());
        }
    }

    Ok(Document::new(fields))
}

/// Reshapes any Firestore read response.
///
/// Handles list responses (`{documents: [...]}`), single documents and the
/// array returned by `runQuery`. Anything else is "no data" and yields
/// `Ok(None)`.
pub fn decode_response(response: &JsonValue) -> FirestoreResult<Option<DecodedResponse>> {
    if let Some(documents) = response.get("documents").and_then(JsonValue::as_array) {
        let decoded = documents
            .iter()
            .map(decode_document)
            .collect::<FirestoreResult<Vec<_>>>()?;
        return Ok(Some(DecodedResponse::Documents(decoded)));
    }

    if response.get("name").is_some() && response.get("fields").is_some() {
        return decode_document(response).map(|doc| Some(DecodedResponse::Document(doc)));
    }

    if let Some(entries) = response.as_array() {
        let mut decoded = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry.get("document") {
                Some(document) => decoded.push(decode_document(document)?),
                None => log::debug!("skipping runQuery entry without a document"),
            }
        }
        return Ok(Some(DecodedResponse::Documents(decoded)));
    }

    Ok(None)
}
