use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::firestore::error::FirestoreResult;
use crate::firestore::model::ResourcePath;

pub mod http;

/// Preconditions and masks attached to a document `PATCH`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatchOptions {
    /// Field paths sent as `updateMask.fieldPaths`. `None` replaces the whole document.
    pub update_mask: Option<Vec<String>>,
    /// Sent as `currentDocument.exists=true`.
    pub require_exists: bool,
}

impl PatchOptions {
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(mask) = &self.update_mask {
            for field in mask {
                params.push(("updateMask.fieldPaths".to_string(), field.clone()));
            }
        }
        if self.require_exists {
            params.push(("currentDocument.exists".to_string(), "true".to_string()));
        }
        params
    }
}

/// One method per Firestore REST call. Implementations return raw wire JSON.
#[async_trait]
pub trait Datastore: Send + Sync + 'static {
    /// `Ok(None)` when the document does not exist.
    async fn get_document(&self, path: &ResourcePath) -> FirestoreResult<Option<JsonValue>>;
    async fn list_documents(&self, collection: &ResourcePath) -> FirestoreResult<JsonValue>;
    async fn patch_document(
        &self,
        path: &ResourcePath,
        body: &JsonValue,
        options: &PatchOptions,
    ) -> FirestoreResult<JsonValue>;
    async fn delete(&self, path: &ResourcePath) -> FirestoreResult<()>;
    /// `parent` is the root for top-level collections or a document path
    /// for sub-collections.
    async fn run_query(&self, parent: &ResourcePath, body: &JsonValue)
        -> FirestoreResult<JsonValue>;
}

#[async_trait]
pub trait TokenProvider: Send + Sync + 'static {
    async fn get_token(&self) -> FirestoreResult<Option<String>>;

    /// Called after the backend rejected the current token.
    fn invalidate_token(&self) {}
}

#[derive(Default, Clone)]
pub struct NoopTokenProvider;

#[async_trait]
impl TokenProvider for NoopTokenProvider {
    async fn get_token(&self) -> FirestoreResult<Option<String>> {
        Ok(None)
    }
}

/// Hands out a fixed bearer token.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> FirestoreResult<Option<String>> {
        Ok(Some(self.token.clone()))
    }
}

pub type TokenProviderArc = Arc<dyn TokenProvider>;
pub type DatastoreArc = Arc<dyn Datastore>;

pub use http::{HttpDatastore, HttpDatastoreBuilder};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_options_render_repeated_mask_params() {
        let options = PatchOptions {
            update_mask: Some(vec!["name".into(), "age".into()]),
            require_exists: true,
        };
        assert_eq!(
            options.query_params(),
            vec![
                ("updateMask.fieldPaths".to_string(), "name".to_string()),
                ("updateMask.fieldPaths".to_string(), "age".to_string()),
                ("currentDocument.exists".to_string(), "true".to_string()),
            ]
        );
        assert!(PatchOptions::default().query_params().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn static_provider_returns_its_token() {
        let provider = StaticTokenProvider::new("abc");
        assert_eq!(provider.get_token().await.unwrap(), Some("abc".to_string()));
        assert_eq!(NoopTokenProvider.get_token().await.unwrap(), None);
    }
}
