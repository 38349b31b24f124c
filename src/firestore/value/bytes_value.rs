use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::firestore::error::{decode_error, FirestoreResult};

/// Raw bytes, carried on the wire as standard base64.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BytesValue(Vec<u8>);

impl BytesValue {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_base64(value: &str) -> FirestoreResult<Self> {
        STANDARD
            .decode(value)
            .map(Self)
            .map_err(|err| decode_error(format!("Invalid bytesValue: {err}")))
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for BytesValue {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}
