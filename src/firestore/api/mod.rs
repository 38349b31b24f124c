mod database;
mod document;
pub mod filter;
pub mod query;
pub mod snapshot;

pub use database::{Firestore, FirestoreBuilder};
pub use filter::{
    CompositeClause, CompositeFilter, CompositeOperator, FieldComparison, FieldFilter,
    FieldFilterClause, FieldOperator, IntoWhereClause, UnaryClause, UnaryFilter, UnaryOperator,
    WhereClause,
};
pub use query::{OrderDirection, OrderKey, Query, QueryDefinition, QueryProjection};
pub use snapshot::{decode_document, decode_response, DecodedResponse, Document};
