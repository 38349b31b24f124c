use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value as JsonValue;

use crate::firestore::constants::RUN_QUERY_PATH;
use crate::firestore::error::{FirestoreErrorCode, FirestoreResult};
use crate::firestore::model::{DatabaseId, ResourcePath};
use crate::firestore::remote::connection::{Connection, ConnectionBuilder, RequestContext};

use super::{Datastore, NoopTokenProvider, PatchOptions, TokenProviderArc};

/// reqwest-backed [`Datastore`]. Requests are sent once; failures propagate.
#[derive(Clone)]
pub struct HttpDatastore {
    connection: Connection,
    auth_provider: TokenProviderArc,
}

#[derive(Clone)]
pub struct HttpDatastoreBuilder {
    connection_builder: ConnectionBuilder,
    auth_provider: TokenProviderArc,
}

impl HttpDatastore {
    pub fn builder(database_id: DatabaseId) -> HttpDatastoreBuilder {
        HttpDatastoreBuilder::new(database_id)
    }

    pub fn from_database_id(database_id: DatabaseId) -> FirestoreResult<Self> {
        Self::builder(database_id).build()
    }

    pub fn base_url(&self) -> &str {
        self.connection.base_url()
    }

    async fn execute<F, Fut, T>(&self, operation: F) -> FirestoreResult<T>
    where
        F: FnOnce(RequestContext) -> Fut,
        Fut: Future<Output = FirestoreResult<T>>,
    {
        let context = RequestContext {
            auth_token: self.auth_provider.get_token().await?,
        };
        let result = operation(context).await;
        if let Err(err) = &result {
            if err.code == FirestoreErrorCode::Unauthenticated {
                self.auth_provider.invalidate_token();
            }
        }
        result
    }
}

impl HttpDatastoreBuilder {
    pub fn new(database_id: DatabaseId) -> Self {
        Self {
            connection_builder: Connection::builder(database_id),
            auth_provider: Arc::new(NoopTokenProvider),
        }
    }

    pub fn with_connection_builder(mut self, builder: ConnectionBuilder) -> Self {
        self.connection_builder = builder;
        self
    }

    pub fn with_auth_provider(mut self, provider: TokenProviderArc) -> Self {
        self.auth_provider = provider;
        self
    }

    pub fn build(self) -> FirestoreResult<HttpDatastore> {
        Ok(HttpDatastore {
            connection: self.connection_builder.build()?,
            auth_provider: self.auth_provider,
        })
    }
}

fn documents_path(path: &ResourcePath) -> String {
    if path.is_empty() {
        "documents".to_string()
    } else {
        format!("documents/{}", path.url_path())
    }
}

fn run_query_path(parent: &ResourcePath) -> String {
    if parent.is_empty() {
        RUN_QUERY_PATH.to_string()
    } else {
        format!("{}:runQuery", documents_path(parent))
    }
}

#[async_trait]
impl Datastore for HttpDatastore {
    async fn get_document(&self, path: &ResourcePath) -> FirestoreResult<Option<JsonValue>> {
        let doc_path = documents_path(path);
        self.execute(|context| async move {
            self.connection
                .invoke_json_optional(Method::GET, &doc_path, &[], None, &context)
                .await
        })
        .await
    }

    async fn list_documents(&self, collection: &ResourcePath) -> FirestoreResult<JsonValue> {
        let collection_path = documents_path(collection);
        self.execute(|context| async move {
            self.connection
                .invoke_json(Method::GET, &collection_path, &[], None, &context)
                .await
        })
        .await
    }

    async fn patch_document(
        &self,
        path: &ResourcePath,
        body: &JsonValue,
        options: &PatchOptions,
    ) -> FirestoreResult<JsonValue> {
        let doc_path = documents_path(path);
        let params = options.query_params();
        self.execute(|context| async move {
            self.connection
                .invoke_json(Method::PATCH, &doc_path, &params, Some(body), &context)
                .await
        })
        .await
    }

    async fn delete(&self, path: &ResourcePath) -> FirestoreResult<()> {
        let target = documents_path(path);
        self.execute(|context| async move {
            self.connection
                .invoke_json(Method::DELETE, &target, &[], None, &context)
                .await
                .map(|_| ())
        })
        .await
    }

    async fn run_query(
        &self,
        parent: &ResourcePath,
        body: &JsonValue,
    ) -> FirestoreResult<JsonValue> {
        let query_path = run_query_path(parent);
        self.execute(|context| async move {
            self.connection
                .invoke_json(Method::POST, &query_path, &[], Some(body), &context)
                .await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::firestore::error::FirestoreResult;
    use crate::firestore::remote::datastore::{StaticTokenProvider, TokenProvider};
    use httpmock::prelude::*;
    use serde_json::json;

    const DB_PATH: &str = "/v1/projects/demo/databases/(default)";

    fn datastore(server: &MockServer, provider: TokenProviderArc) -> HttpDatastore {
        HttpDatastore::builder(DatabaseId::default("demo"))
            .with_connection_builder(
                Connection::builder(DatabaseId::default("demo"))
                    .with_emulator_host(server.address().to_string()),
            )
            .with_auth_provider(provider)
            .build()
            .unwrap()
    }

    #[derive(Default)]
    struct RecordingProvider {
        invalidated: AtomicBool,
    }

    #[async_trait]
    impl TokenProvider for RecordingProvider {
        async fn get_token(&self) -> FirestoreResult<Option<String>> {
            Ok(Some("stale".into()))
        }

        fn invalidate_token(&self) {
            self.invalidated.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn run_query_paths() {
        assert_eq!(run_query_path(&ResourcePath::root()), "documents:runQuery");
        assert_eq!(
            run_query_path(&ResourcePath::from_segments(["users", "ada"])),
            "documents/users/ada:runQuery"
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn run_query_posts_body_with_bearer_token() {
        let server = MockServer::start_async().await;
        let body = json!({ "structuredQuery": { "from": [{ "collectionId": "users" }] } });
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(format!("{DB_PATH}/documents:runQuery"))
                    .header("authorization", "Bearer secret")
                    .json_body(body.clone());
                then.status(200).json_body(json!([{ "readTime": "2024-01-01T00:00:00Z" }]));
            })
            .await;

        let datastore = datastore(&server, Arc::new(StaticTokenProvider::new("secret")));
        let response = datastore
            .run_query(&ResourcePath::root(), &body)
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(response.is_array());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn missing_document_is_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(format!("{DB_PATH}/documents/users/ghost"));
                then.status(404);
            })
            .await;

        let datastore = datastore(&server, Arc::new(NoopTokenProvider));
        let response = datastore
            .get_document(&ResourcePath::from_segments(["users", "ghost"]))
            .await
            .unwrap();
        assert!(response.is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unauthenticated_invalidates_token() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE);
                then.status(401).json_body(json!({
                    "error": { "message": "token expired", "status": "UNAUTHENTICATED" }
                }));
            })
            .await;

        let provider = Arc::new(RecordingProvider::default());
        let datastore = datastore(&server, provider.clone());
        let err = datastore
            .delete(&ResourcePath::from_segments(["users", "ada"]))
            .await
            .unwrap_err();

        assert_eq!(err.code, FirestoreErrorCode::Unauthenticated);
        assert!(provider.invalidated.load(Ordering::SeqCst));
    }
}
