//! Cloud Firestore over the v1 REST API: structured queries, the value codec
//! and plain document reads and writes.

pub mod api;
mod constants;
pub mod error;
pub mod model;
pub mod remote;
pub mod value;

pub use api::{
    CompositeFilter, CompositeOperator, DecodedResponse, Document, FieldFilter, Firestore,
    FirestoreBuilder, OrderDirection, Query, QueryProjection, UnaryFilter, UnaryOperator,
};
pub use error::{ErrorCategory, FirestoreError, FirestoreErrorCode, FirestoreResult};
pub use model::PathBuilder;
pub use remote::{StaticTokenProvider, TokenProvider, TokenProviderArc};
pub use value::FirestoreValue;
