use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::firestore::api::query::{OrderKey, QueryDefinition};
use crate::firestore::remote::serializer::encode_value;
use crate::firestore::value::FirestoreValue;

/// Builds the `runQuery` request body. Only the parts that were set appear,
/// and a definition with nothing set encodes to `{}`.
pub(crate) fn encode_run_query_body(definition: &QueryDefinition) -> JsonValue {
    let structured = encode_structured_query(definition);
    if structured.is_empty() {
        JsonValue::Object(JsonMap::new())
    } else {
        json!({ "structuredQuery": structured })
    }
}

pub(crate) fn encode_structured_query(definition: &QueryDefinition) -> JsonMap<String, JsonValue> {
    let mut structured = JsonMap::new();

    if !definition.projection().is_empty() {
        let fields: Vec<_> = definition
            .projection()
            .iter()
            .map(|field| json!({ "fieldPath": field }))
            .collect();
        structured.insert("select".to_string(), json!({ "fields": fields }));
    }

    if !definition.order_by().is_empty() {
        let orders: Vec<_> = definition.order_by().iter().map(encode_order).collect();
        structured.insert("orderBy".to_string(), JsonValue::Array(orders));
    }

    if let Some(collection_id) = definition.collection_id() {
        structured.insert(
            "from".to_string(),
            json!([{ "collectionId": collection_id }]),
        );
    }

    if let Some(where_clause) = definition.where_clause() {
        structured.insert("where".to_string(), where_clause.to_json());
    }

    if let Some(values) = definition.start_at() {
        structured.insert("startAt".to_string(), encode_cursor(values));
    }

    if let Some(values) = definition.end_at() {
        structured.insert("endAt".to_string(), encode_cursor(values));
    }

    if let Some(offset) = definition.offset() {
        structured.insert("offset".to_string(), json!(offset));
    }

    if let Some(limit) = definition.limit() {
        structured.insert("limit".to_string(), json!(limit));
    }

    structured
}

fn encode_order(order: &OrderKey) -> JsonValue {
    json!({
        "field": { "fieldPath": order.field() },
        "direction": order.direction(),
    })
}

fn encode_cursor(values: &[FirestoreValue]) -> JsonValue {
    json!({
        "values": values.iter().map(encode_value).collect::<Vec<_>>()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::api::filter::{FieldFilter, IntoWhereClause};

    #[test]
    fn empty_definition_encodes_to_empty_object() {
        assert_eq!(
            encode_run_query_body(&QueryDefinition::default()),
            json!({})
        );
    }

    #[test]
    fn encodes_every_configured_part() {
        let mut definition = QueryDefinition::default();
        definition.projection = vec!["name".into()];
        definition.order_by = vec![OrderKey::new("age", "DESCENDING")];
        definition.collection_id = Some("users".into());
        definition.where_clause = Some(
            FieldFilter::new()
                .equal_to("active", true)
                .into_where_clause()
                .unwrap(),
        );
        definition.start_at = Some(vec![FirestoreValue::from_integer(30)]);
        definition.end_at = Some(vec![FirestoreValue::from_integer(60)]);
        definition.offset = Some(5);
        definition.limit = Some(10);

        assert_eq!(
            encode_run_query_body(&definition),
            json!({
                "structuredQuery": {
                    "select": { "fields": [{ "fieldPath": "name" }] },
                    "orderBy": [{ "field": { "fieldPath": "age" }, "direction": "DESCENDING" }],
                    "from": [{ "collectionId": "users" }],
                    "where": {
                        "fieldFilter": {
                            "field": { "fieldPath": "active" },
                            "op": "EQUAL",
                            "value": { "booleanValue": true }
                        }
                    },
                    "startAt": { "values": [{ "integerValue": "30" }] },
                    "endAt": { "values": [{ "integerValue": "60" }] },
                    "offset": 5,
                    "limit": 10
                }
            })
        );
    }
}
