pub mod connection;
pub mod datastore;
pub mod rpc_error;
pub mod serializer;
pub(crate) mod structured_query;

pub use connection::{Connection, ConnectionBuilder, RequestContext};
pub use datastore::{
    Datastore, DatastoreArc, HttpDatastore, HttpDatastoreBuilder, NoopTokenProvider,
    PatchOptions, StaticTokenProvider, TokenProvider, TokenProviderArc,
};
pub use serializer::{decode_fields, decode_value, encode_fields, encode_value};
