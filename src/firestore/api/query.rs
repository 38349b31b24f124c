use crate::firestore::api::filter::{
    CompositeFilter, FieldFilter, IntoWhereClause, UnaryFilter, WhereClause,
};
use crate::firestore::api::snapshot::{decode_response, DecodedResponse};
use crate::firestore::api::Firestore;
use crate::firestore::error::FirestoreResult;
use crate::firestore::model::{PathBuilder, ResourcePath};
use crate::firestore::remote::structured_query::encode_run_query_body;
use crate::firestore::value::FirestoreValue;
use serde_json::Value as JsonValue;

/// Canonical sort directions. `order_by` accepts any string and passes it
/// through untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

impl OrderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Ascending => "ASCENDING",
            OrderDirection::Descending => "DESCENDING",
        }
    }
}

impl From<OrderDirection> for String {
    fn from(direction: OrderDirection) -> Self {
        direction.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderKey {
    field: String,
    direction: String,
}

impl OrderKey {
    pub fn new(field: impl Into<String>, direction: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: direction.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn direction(&self) -> &str {
        &self.direction
    }
}

/// Everything a structured query can carry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryDefinition {
    pub(crate) projection: Vec<String>,
    pub(crate) order_by: Vec<OrderKey>,
    pub(crate) collection_id: Option<String>,
    pub(crate) where_clause: Option<WhereClause>,
    pub(crate) start_at: Option<Vec<FirestoreValue>>,
    pub(crate) end_at: Option<Vec<FirestoreValue>>,
    pub(crate) offset: Option<u32>,
    pub(crate) limit: Option<u32>,
}

impl QueryDefinition {
    pub fn projection(&self) -> &[String] {
        &self.projection
    }

    pub fn order_by(&self) -> &[OrderKey] {
        &self.order_by
    }

    pub fn collection_id(&self) -> Option<&str> {
        self.collection_id.as_deref()
    }

    pub fn where_clause(&self) -> Option<&WhereClause> {
        self.where_clause.as_ref()
    }

    pub fn start_at(&self) -> Option<&[FirestoreValue]> {
        self.start_at.as_deref()
    }

    pub fn end_at(&self) -> Option<&[FirestoreValue]> {
        self.end_at.as_deref()
    }

    pub fn offset(&self) -> Option<u32> {
        self.offset
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }
}

/// First stage of a query: projection and ordering.
///
/// Calling [`QueryProjection::from`] moves on to the [`Query`] stage, after
/// which the projection can no longer change.
#[derive(Clone, Debug)]
pub struct QueryProjection {
    firestore: Firestore,
    fields: Vec<String>,
    order_by: Vec<OrderKey>,
}

impl QueryProjection {
    pub(crate) fn new(firestore: Firestore) -> Self {
        Self {
            firestore,
            fields: Vec::new(),
            order_by: Vec::new(),
        }
    }

    pub fn add_field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn add_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: impl Into<String>) -> Self {
        self.order_by.push(OrderKey::new(field, direction));
        self
    }

    pub fn from(self, collection_id: impl Into<String>) -> Query {
        Query {
            firestore: self.firestore,
            parent: ResourcePath::root(),
            definition: QueryDefinition {
                projection: self.fields,
                order_by: self.order_by,
                collection_id: Some(collection_id.into()),
                ..QueryDefinition::default()
            },
        }
    }
}

/// Second stage of a query: source, filter, cursors and paging.
#[derive(Clone, Debug)]
pub struct Query {
    firestore: Firestore,
    parent: ResourcePath,
    definition: QueryDefinition,
}

impl Query {
    /// Sets the `where` clause. A later call replaces an earlier one.
    pub fn filter(mut self, clause: impl IntoWhereClause) -> FirestoreResult<Self> {
        self.definition.where_clause = Some(clause.into_where_clause()?);
        Ok(self)
    }

    pub fn where_composite(self, filter: CompositeFilter) -> FirestoreResult<Self> {
        self.filter(filter)
    }

    pub fn where_field(self, filter: FieldFilter) -> FirestoreResult<Self> {
        self.filter(filter)
    }

    pub fn where_unary(self, filter: UnaryFilter) -> FirestoreResult<Self> {
        self.filter(filter)
    }

    /// Scopes the query to a sub-collection under `document_path`.
    pub fn collection_in(mut self, document_path: &PathBuilder) -> FirestoreResult<Self> {
        self.parent = document_path.to_resource_path()?;
        Ok(self)
    }

    pub fn start_at<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FirestoreValue>,
    {
        self.definition.start_at = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn end_at<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FirestoreValue>,
    {
        self.definition.end_at = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.definition.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.definition.limit = Some(limit);
        self
    }

    pub fn definition(&self) -> &QueryDefinition {
        &self.definition
    }

    /// The request body `run` would send.
    pub fn complete(&self) -> JsonValue {
        encode_run_query_body(&self.definition)
    }

    /// Executes the query. `Ok(None)` means the backend returned no data.
    pub async fn run(self) -> FirestoreResult<Option<DecodedResponse>> {
        let body = self.complete();
        let response = self
            .firestore
            .datastore()
            .run_query(&self.parent, &body)
            .await?;
        decode_response(&response)
    }
}
