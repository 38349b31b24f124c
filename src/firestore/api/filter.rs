use serde_json::{json, Value as JsonValue};

use crate::firestore::error::{builder_misuse, FirestoreResult};
use crate::firestore::remote::serializer::encode_value;
use crate::firestore::value::FirestoreValue;

/// Comparison operators accepted by `fieldFilter`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldOperator {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    ArrayContains,
    ArrayContainsAny,
    In,
    NotIn,
}

impl FieldOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldOperator::LessThan => "LESS_THAN",
            FieldOperator::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            FieldOperator::GreaterThan => "GREATER_THAN",
            FieldOperator::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            FieldOperator::Equal => "EQUAL",
            FieldOperator::NotEqual => "NOT_EQUAL",
            FieldOperator::ArrayContains => "ARRAY_CONTAINS",
            FieldOperator::ArrayContainsAny => "ARRAY_CONTAINS_ANY",
            FieldOperator::In => "IN",
            FieldOperator::NotIn => "NOT_IN",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CompositeOperator {
    #[default]
    And,
    Or,
}

impl CompositeOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositeOperator::And => "AND",
            CompositeOperator::Or => "OR",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    In,
    Contains,
    IsNan,
    IsNull,
    IsNotNan,
    IsNotNull,
}

impl UnaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::In => "IN",
            UnaryOperator::Contains => "CONTAINS",
            UnaryOperator::IsNan => "IS_NAN",
            UnaryOperator::IsNull => "IS_NULL",
            UnaryOperator::IsNotNan => "IS_NOT_NAN",
            UnaryOperator::IsNotNull => "IS_NOT_NULL",
        }
    }
}

/// One `(field, operator, literal)` comparison.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldComparison {
    field: String,
    op: FieldOperator,
    value: FirestoreValue,
}

impl FieldComparison {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> FieldOperator {
        self.op
    }

    pub fn value(&self) -> &FirestoreValue {
        &self.value
    }

    fn to_json(&self) -> JsonValue {
        json!({
            "fieldFilter": {
                "field": { "fieldPath": self.field },
                "op": self.op.as_str(),
                "value": encode_value(&self.value),
            }
        })
    }
}

/// Accumulates field comparisons in call order.
///
/// ```
/// use firebase_rest_lite::firestore::api::FieldFilter;
///
/// let clause = FieldFilter::new()
///     .equal_to("active", true)
///     .greater_than("age", 18)
///     .complete()
///     .unwrap();
/// assert!(clause.to_json().is_array());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldFilter {
    comparisons: Vec<FieldComparison>,
}

impl FieldFilter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(
        mut self,
        field: impl Into<String>,
        op: FieldOperator,
        value: impl Into<FirestoreValue>,
    ) -> Self {
        self.comparisons.push(FieldComparison {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn less_than(self, field: impl Into<String>, value: impl Into<FirestoreValue>) -> Self {
        self.push(field, FieldOperator::LessThan, value)
    }

    pub fn less_than_or_equal(
        self,
        field: impl Into<String>,
        value: impl Into<FirestoreValue>,
    ) -> Self {
        self.push(field, FieldOperator::LessThanOrEqual, value)
    }

    pub fn greater_than(self, field: impl Into<String>, value: impl Into<FirestoreValue>) -> Self {
        self.push(field, FieldOperator::GreaterThan, value)
    }

    pub fn greater_than_or_equal(
        self,
        field: impl Into<String>,
        value: impl Into<FirestoreValue>,
    ) -> Self {
        self.push(field, FieldOperator::GreaterThanOrEqual, value)
    }

    pub fn equal_to(self, field: impl Into<String>, value: impl Into<FirestoreValue>) -> Self {
        self.push(field, FieldOperator::Equal, value)
    }

    pub fn not_equal(self, field: impl Into<String>, value: impl Into<FirestoreValue>) -> Self {
        self.push(field, FieldOperator::NotEqual, value)
    }

    pub fn array_contains(
        self,
        field: impl Into<String>,
        value: impl Into<FirestoreValue>,
    ) -> Self {
        self.push(field, FieldOperator::ArrayContains, value)
    }

    pub fn array_contains_any(
        self,
        field: impl Into<String>,
        values: impl Into<FirestoreValue>,
    ) -> Self {
        self.push(field, FieldOperator::ArrayContainsAny, values)
    }

    pub fn is_in(self, field: impl Into<String>, values: impl Into<FirestoreValue>) -> Self {
        self.push(field, FieldOperator::In, values)
    }

    pub fn not_in(self, field: impl Into<String>, values: impl Into<FirestoreValue>) -> Self {
        self.push(field, FieldOperator::NotIn, values)
    }

    pub fn comparisons(&self) -> &[FieldComparison] {
        &self.comparisons
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    /// One comparison completes to itself, several to an ordered list.
    pub fn complete(&self) -> FirestoreResult<FieldFilterClause> {
        match self.comparisons.as_slice() {
            [] => Err(builder_misuse("field filter has no comparisons")),
            [single] => Ok(FieldFilterClause::Single(single.clone())),
            many => Ok(FieldFilterClause::Many(many.to_vec())),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldFilterClause {
    Single(FieldComparison),
    Many(Vec<FieldComparison>),
}

impl FieldFilterClause {
    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldFilterClause::Single(comparison) => comparison.to_json(),
            FieldFilterClause::Many(comparisons) => {
                JsonValue::Array(comparisons.iter().map(FieldComparison::to_json).collect())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompositeClause {
    op: CompositeOperator,
    children: Vec<WhereClause>,
}

impl CompositeClause {
    pub fn operator(&self) -> CompositeOperator {
        self.op
    }

    pub fn children(&self) -> &[WhereClause] {
        &self.children
    }

    /// A lone wire filter is sent as an object, several as an array.
    pub fn to_json(&self) -> JsonValue {
        let mut filters: Vec<JsonValue> = Vec::new();
        for child in &self.children {
            match child {
                WhereClause::FieldComparisons(FieldFilterClause::Many(comparisons)) => {
                    filters.extend(comparisons.iter().map(FieldComparison::to_json));
                }
                other => filters.push(other.to_json()),
            }
        }
        let filters = match filters.len() {
            1 => filters.remove(0),
            _ => JsonValue::Array(filters),
        };
        json!({
            "op": self.op.as_str(),
            "filters": filters,
        })
    }
}

/// Combines filters of any kind, composites included, under AND or OR.
/// Configurable once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompositeFilter {
    clause: Option<CompositeClause>,
}

impl CompositeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps one completed filter. `op` defaults to AND.
    pub fn filters(
        self,
        filter: impl IntoWhereClause,
        op: Option<CompositeOperator>,
    ) -> FirestoreResult<Self> {
        self.combine([filter], op)
    }

    /// Wraps several completed filters, in order. `op` defaults to AND.
    pub fn combine<I>(mut self, filters: I, op: Option<CompositeOperator>) -> FirestoreResult<Self>
    where
        I: IntoIterator,
        I::Item: IntoWhereClause,
    {
        if self.clause.is_some() {
            return Err(builder_misuse("composite filter already configured"));
        }
        let children = filters
            .into_iter()
            .map(IntoWhereClause::into_where_clause)
            .collect::<FirestoreResult<Vec<_>>>()?;
        if children.is_empty() {
            return Err(builder_misuse("composite filter needs at least one filter"));
        }
        self.clause = Some(CompositeClause {
            op: op.unwrap_or_default(),
            children,
        });
        Ok(self)
    }

    pub fn complete(&self) -> FirestoreResult<CompositeClause> {
        self.clause
            .clone()
            .ok_or_else(|| builder_misuse("composite filter has no filters configured"))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnaryClause {
    field: String,
    op: UnaryOperator,
}

impl UnaryClause {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> UnaryOperator {
        self.op
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "op": self.op.as_str(),
            "field": { "fieldPath": self.field },
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnaryFilter {
    field: Option<String>,
    op: Option<UnaryOperator>,
}

impl UnaryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn set_operator(mut self, op: UnaryOperator) -> Self {
        self.op = Some(op);
        self
    }

    pub fn complete(&self) -> FirestoreResult<UnaryClause> {
        let field = self
            .field
            .clone()
            .ok_or_else(|| builder_misuse("unary filter requires a field"))?;
        let op = self
            .op
            .ok_or_else(|| builder_misuse("unary filter requires an operator"))?;
        Ok(UnaryClause { field, op })
    }
}

/// The `where` entry of a structured query.
#[derive(Clone, Debug, PartialEq)]
pub enum WhereClause {
    Composite(CompositeClause),
    FieldComparisons(FieldFilterClause),
    Unary(UnaryClause),
}

impl WhereClause {
    pub fn to_json(&self) -> JsonValue {
        match self {
            WhereClause::Composite(clause) => json!({ "compositeFilter": clause.to_json() }),
            WhereClause::FieldComparisons(clause) => clause.to_json(),
            WhereClause::Unary(clause) => json!({ "unaryFilter": clause.to_json() }),
        }
    }
}

/// Anything that can become a [`WhereClause`], completed builders included.
pub trait IntoWhereClause {
    fn into_where_clause(self) -> FirestoreResult<WhereClause>;
}

impl IntoWhereClause for WhereClause {
    fn into_where_clause(self) -> FirestoreResult<WhereClause> {
        Ok(self)
    }
}

impl IntoWhereClause for CompositeClause {
    fn into_where_clause(self) -> FirestoreResult<WhereClause> {
        Ok(WhereClause::Composite(self))
    }
}

impl IntoWhereClause for FieldFilterClause {
    fn into_where_clause(self) -> FirestoreResult<WhereClause> {
        Ok(WhereClause::FieldComparisons(self))
    }
}

impl IntoWhereClause for UnaryClause {
    fn into_where_clause(self) -> FirestoreResult<WhereClause> {
        Ok(WhereClause::Unary(self))
    }
}

impl IntoWhereClause for CompositeFilter {
    fn into_where_clause(self) -> FirestoreResult<WhereClause> {
        self.complete().map(WhereClause::Composite)
    }
}

impl IntoWhereClause for FieldFilter {
    fn into_where_clause(self) -> FirestoreResult<WhereClause> {
        self.complete().map(WhereClause::FieldComparisons)
    }
}

impl IntoWhereClause for UnaryFilter {
    fn into_where_clause(self) -> FirestoreResult<WhereClause> {
        self.complete().map(WhereClause::Unary)
    }
}

impl IntoWhereClause for &CompositeFilter {
    fn into_where_clause(self) -> FirestoreResult<WhereClause> {
        self.complete().map(WhereClause::Composite)
    }
}

impl IntoWhereClause for &FieldFilter {
    fn into_where_clause(self) -> FirestoreResult<WhereClause> {
        self.complete().map(WhereClause::FieldComparisons)
    }
}

impl IntoWhereClause for &UnaryFilter {
    fn into_where_clause(self) -> FirestoreResult<WhereClause> {
        self.complete().map(WhereClause::Unary)
    }
}

impl<T: IntoWhereClause> IntoWhereClause for FirestoreResult<T> {
    fn into_where_clause(self) -> FirestoreResult<WhereClause> {
        self?.into_where_clause()
    }
}
