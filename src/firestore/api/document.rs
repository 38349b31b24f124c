use serde::Serialize;
use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::firestore::api::snapshot::{decode_document, decode_response, DecodedResponse, Document};
use crate::firestore::api::Firestore;
use crate::firestore::error::{builder_misuse, FirestoreResult};
use crate::firestore::model::ResourcePath;
use crate::firestore::remote::datastore::PatchOptions;
use crate::firestore::remote::serializer::encode_fields;

/// Plain document reads and writes. `collection` may be a nested path such
/// as `users/ada/posts`, e.g. one produced by
/// [`PathBuilder`](crate::firestore::model::PathBuilder).
impl Firestore {
    /// `Ok(None)` when the document does not exist.
    pub async fn get_document(
        &self,
        collection: &str,
        document: &str,
    ) -> FirestoreResult<Option<DecodedResponse>> {
        let path = document_path(collection, document)?;
        match self.datastore().get_document(&path).await? {
            Some(response) => decode_response(&response),
            None => Ok(None),
        }
    }

    pub async fn get_collection(&self, collection: &str) -> FirestoreResult<Option<DecodedResponse>> {
        let path = collection_path(collection)?;
        let response = self.datastore().list_documents(&path).await?;
        decode_response(&response)
    }

    /// Creates the document, replacing any existing one with the same id.
    pub async fn create_document<T>(
        &self,
        collection: &str,
        document: &str,
        data: &T,
    ) -> FirestoreResult<Document>
    where
        T: Serialize + ?Sized,
    {
        let path = document_path(collection, document)?;
        let fields = native_object(data)?;
        let body = json!({ "fields": encode_fields(&fields) });
        let response = self
            .datastore()
            .patch_document(&path, &body, &PatchOptions::default())
            .await?;
        decode_document(&response)
    }

    /// Overwrites only the keys present in `data`. Fails if the document
    /// does not exist.
    pub async fn update_document<T>(
        &self,
        collection: &str,
        document: &str,
        data: &T,
    ) -> FirestoreResult<Document>
    where
        T: Serialize + ?Sized,
    {
        let path = document_path(collection, document)?;
        let fields = native_object(data)?;
        let options = PatchOptions {
            update_mask: Some(fields.keys().cloned().collect()),
            require_exists: true,
        };
        let body = json!({ "fields": encode_fields(&fields) });
        let response = self.datastore().patch_document(&path, &body, &options).await?;
        decode_document(&response)
    }

    pub async fn delete_document(&self, collection: &str, document: &str) -> FirestoreResult<()> {
        let path = document_path(collection, document)?;
        self.datastore().delete(&path).await
    }

    pub async fn delete_collection(&self, collection: &str) -> FirestoreResult<()> {
        let path = collection_path(collection)?;
        self.datastore().delete(&path).await
    }

    /// Removes `fields` from the document and leaves the rest untouched.
    pub async fn delete_document_fields<I, S>(
        &self,
        collection: &str,
        document: &str,
        fields: I,
    ) -> FirestoreResult<Document>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = document_path(collection, document)?;
        let mask: Vec<String> = fields.into_iter().map(Into::into).collect();
        if mask.is_empty() {
            return Err(builder_misuse("no fields given to delete"));
        }
        let options = PatchOptions {
            update_mask: Some(mask),
            require_exists: true,
        };
        // Masked fields missing from the body are deleted.
        let body = json!({ "fields": {} });
        let response = self.datastore().patch_document(&path, &body, &options).await?;
        decode_document(&response)
    }
}

fn collection_path(collection: &str) -> FirestoreResult<ResourcePath> {
    let path = ResourcePath::from_string(collection)?;
    if path.is_empty() {
        return Err(builder_misuse("collection path must not be empty"));
    }
    Ok(path)
}

fn document_path(collection: &str, document: &str) -> FirestoreResult<ResourcePath> {
    let document = ResourcePath::from_string(document)?;
    if document.is_empty() {
        return Err(builder_misuse("document id must not be empty"));
    }
    // `document` may itself be a nested path such as `ada/posts/p1`.
    Ok(collection_path(collection)?.child(document.segments().iter().cloned()))
}

fn native_object<T: Serialize + ?Sized>(data: &T) -> FirestoreResult<JsonMap<String, JsonValue>> {
    match serde_json::to_value(data) {
        Ok(JsonValue::Object(map)) => Ok(map),
        Ok(_) => Err(builder_misuse("document data must be an object")),
        Err(err) => Err(builder_misuse(format!("document data is not serializable: {err}"))),
    }
}
