use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use firebase_rest_lite::firestore::api::{CompositeOperator, UnaryOperator};
use firebase_rest_lite::firestore::model::ResourcePath;
use firebase_rest_lite::firestore::remote::{Datastore, PatchOptions};
use firebase_rest_lite::firestore::{
    CompositeFilter, DecodedResponse, ErrorCategory, FieldFilter, Firestore, FirestoreResult,
    OrderDirection, PathBuilder, UnaryFilter,
};
use serde_json::{json, Value};

/// Answers every query with `response` and records what was sent.
struct RecordingDatastore {
    response: Value,
    sent: Mutex<Vec<(String, Value)>>,
}

impl RecordingDatastore {
    fn answering(response: Value) -> Arc<Self> {
        Arc::new(Self {
            response,
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<(String, Value)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Datastore for RecordingDatastore {
    async fn get_document(&self, _path: &ResourcePath) -> FirestoreResult<Option<Value>> {
        Ok(None)
    }

    async fn list_documents(&self, _collection: &ResourcePath) -> FirestoreResult<Value> {
        Ok(json!({}))
    }

    async fn patch_document(
        &self,
        _path: &ResourcePath,
        body: &Value,
        _options: &PatchOptions,
    ) -> FirestoreResult<Value> {
        Ok(body.clone())
    }

    async fn delete(&self, _path: &ResourcePath) -> FirestoreResult<()> {
        Ok(())
    }

    async fn run_query(&self, parent: &ResourcePath, body: &Value) -> FirestoreResult<Value> {
        self.sent
            .lock()
            .unwrap()
            .push((parent.canonical_string(), body.clone()));
        Ok(self.response.clone())
    }
}

fn firestore_with(datastore: Arc<RecordingDatastore>) -> Firestore {
    Firestore::builder("integration")
        .with_datastore(datastore)
        .build()
        .expect("firestore")
}

fn wire_user(id: &str, age: i64) -> Value {
    json!({
        "document": {
            "name": format!("projects/integration/databases/(default)/documents/users/{id}"),
            "fields": {
                "age": { "integerValue": age.to_string() },
                "tags": { "arrayValue": { "values": [
                    { "stringValue": "admin" },
                    { "mapValue": { "fields": { "since": { "integerValue": "2020" } } } }
                ] } }
            },
            "createTime": "2024-01-01T00:00:00Z",
            "updateTime": "2024-02-01T00:00:00Z"
        },
        "readTime": "2024-03-01T00:00:00Z"
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn full_query_is_sent_and_results_decoded() {
    let datastore = RecordingDatastore::answering(json!([
        wire_user("ada", 36),
        wire_user("grace", 45),
        { "readTime": "2024-03-01T00:00:00Z" }
    ]));
    let firestore = firestore_with(datastore.clone());

    let adults = FieldFilter::new()
        .greater_than_or_equal("age", 18)
        .array_contains("tags", "admin");
    let documents = firestore
        .query()
        .add_fields(["age", "tags"])
        .order_by("age", OrderDirection::Ascending)
        .from("users")
        .filter(CompositeFilter::new().filters(&adults, Some(CompositeOperator::And)))
        .unwrap()
        .start_at([30])
        .end_at([50])
        .offset(0)
        .limit(20)
        .run()
        .await
        .unwrap()
        .expect("documents")
        .into_documents();

    let sent = datastore.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "");
    let structured = &sent[0].1["structuredQuery"];
    assert_eq!(structured["from"], json!([{ "collectionId": "users" }]));
    assert_eq!(structured["where"]["compositeFilter"]["op"], "AND");
    assert_eq!(
        structured["where"]["compositeFilter"]["filters"][1]["fieldFilter"]["op"],
        "ARRAY_CONTAINS"
    );
    assert_eq!(structured["startAt"], json!({ "values": [{ "integerValue": "30" }] }));
    assert_eq!(structured["limit"], 20);

    let ids: Vec<_> = documents.iter().map(|doc| doc.id().to_string()).collect();
    assert_eq!(ids, vec!["ada", "grace"]);
    assert_eq!(documents[0].get("age"), Some(&json!(36)));
    assert_eq!(
        documents[0].get("tags"),
        Some(&json!(["admin", { "since": 2020 }]))
    );
    assert_eq!(documents[1].update_time(), Some("2024-02-01T00:00:00Z"));
}

#[tokio::test(flavor = "multi_thread")]
async fn sub_collection_queries_use_parent_document() {
    let datastore = RecordingDatastore::answering(json!([]));
    let firestore = firestore_with(datastore.clone());

    let response = firestore
        .query()
        .from("posts")
        .collection_in(&PathBuilder::new().collection("users").document("ada"))
        .unwrap()
        .filter(
            UnaryFilter::new()
                .set_field("deletedAt")
                .set_operator(UnaryOperator::IsNull),
        )
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(response, Some(DecodedResponse::Documents(Vec::new())));
    let sent = datastore.sent();
    assert_eq!(sent[0].0, "users/ada");
    assert_eq!(
        sent[0].1["structuredQuery"]["where"]["unaryFilter"]["op"],
        "IS_NULL"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn unexpected_payload_is_no_data() {
    let datastore = RecordingDatastore::answering(json!({}));
    let response = firestore_with(datastore)
        .query()
        .from("users")
        .run()
        .await
        .unwrap();
    assert!(response.is_none());
}

#[test]
fn builder_misuse_is_reported_before_sending() {
    let datastore = RecordingDatastore::answering(json!([]));
    let firestore = firestore_with(datastore.clone());

    let err = firestore
        .query()
        .from("users")
        .filter(CompositeFilter::new())
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::BuilderMisuse);

    let field_filter = FieldFilter::new().equal_to("a", 1);
    let err = CompositeFilter::new()
        .filters(&field_filter, None)
        .and_then(|composite| composite.filters(&field_filter, None))
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::BuilderMisuse);
    assert!(datastore.sent().is_empty());
}
