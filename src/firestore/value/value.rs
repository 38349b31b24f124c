use std::collections::BTreeMap;

use serde_json::{json, Number, Value as JsonValue};

use crate::firestore::model::{GeoPoint, Timestamp};
use crate::firestore::value::{ArrayValue, BytesValue, MapValue};

/// One Firestore value. Exactly one [`ValueKind`] is populated.
#[derive(Clone, Debug, PartialEq)]
pub struct FirestoreValue {
    kind: ValueKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ValueKind {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Timestamp(Timestamp),
    String(String),
    Bytes(BytesValue),
    Reference(String),
    GeoPoint(GeoPoint),
    Array(ArrayValue),
    Map(MapValue),
}

impl FirestoreValue {
    fn with_kind(kind: ValueKind) -> Self {
        Self { kind }
    }

    pub fn null() -> Self {
        Self::with_kind(ValueKind::Null)
    }

    pub fn from_bool(value: bool) -> Self {
        Self::with_kind(ValueKind::Boolean(value))
    }

    pub fn from_integer(value: i64) -> Self {
        Self::with_kind(ValueKind::Integer(value))
    }

    pub fn from_double(value: f64) -> Self {
        Self::with_kind(ValueKind::Double(value))
    }

    pub fn from_timestamp(value: Timestamp) -> Self {
        Self::with_kind(ValueKind::Timestamp(value))
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self::with_kind(ValueKind::String(value.into()))
    }

    pub fn from_bytes(value: BytesValue) -> Self {
        Self::with_kind(ValueKind::Bytes(value))
    }

    /// A reference to another document, given as its full resource name.
    pub fn from_reference(name: impl Into<String>) -> Self {
        Self::with_kind(ValueKind::Reference(name.into()))
    }

    pub fn from_geo_point(value: GeoPoint) -> Self {
        Self::with_kind(ValueKind::GeoPoint(value))
    }

    pub fn from_array(values: Vec<FirestoreValue>) -> Self {
        Self::with_kind(ValueKind::Array(ArrayValue::new(values)))
    }

    pub fn from_map(map: BTreeMap<String, FirestoreValue>) -> Self {
        Self::with_kind(ValueKind::Map(MapValue::new(map)))
    }

    /// Encodes a native JSON value.
    ///
    /// Integral numbers that fit in `i64` become `integerValue`; every other
    /// number becomes `doubleValue`. Firestore integers are signed 64-bit,
    /// so an unsigned value above `i64::MAX` is stored as a double and loses
    /// precision (`u64::MAX` reads back as `1.8446744073709552e19`).
    /// Timestamps, bytes, references and geo points have no unambiguous JSON
    /// form and must use their typed constructors.
    pub fn from_native(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::null(),
            JsonValue::Bool(boolean) => Self::from_bool(*boolean),
            JsonValue::Number(number) => match number.as_i64() {
                Some(integer) => Self::from_integer(integer),
                None => number
                    .as_f64()
                    .map(Self::from_double)
                    .unwrap_or_else(Self::null),
            },
            JsonValue::String(string) => Self::from_string(string.as_str()),
            JsonValue::Array(items) => {
                Self::from_array(items.iter().map(Self::from_native).collect())
            }
            JsonValue::Object(object) => Self::from_map(
                object
                    .iter()
                    .map(|(key, value)| (key.clone(), Self::from_native(value)))
                    .collect(),
            ),
        }
    }

    /// Converts back into a native JSON value.
    ///
    /// Timestamps render as RFC 3339 strings, bytes as base64 and geo points
    /// as `{latitude, longitude}`. Non-finite doubles have no JSON form and
    /// become `null`.
    pub fn to_native(&self) -> JsonValue {
        match &self.kind {
            ValueKind::Null => JsonValue::Null,
            ValueKind::Boolean(boolean) => JsonValue::Bool(*boolean),
            ValueKind::Integer(integer) => JsonValue::from(*integer),
            ValueKind::Double(double) => Number::from_f64(*double)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            ValueKind::Timestamp(timestamp) => JsonValue::String(timestamp.to_rfc3339()),
            ValueKind::String(string) => JsonValue::String(string.clone()),
            ValueKind::Bytes(bytes) => JsonValue::String(bytes.to_base64()),
            ValueKind::Reference(reference) => JsonValue::String(reference.clone()),
            ValueKind::GeoPoint(point) => json!({
                "latitude": point.latitude(),
                "longitude": point.longitude(),
            }),
            ValueKind::Array(array) => {
                JsonValue::Array(array.values().iter().map(Self::to_native).collect())
            }
            ValueKind::Map(map) => JsonValue::Object(
                map.fields()
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_native()))
                    .collect(),
            ),
        }
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }
}

impl From<&str> for FirestoreValue {
    fn from(value: &str) -> Self {
        Self::from_string(value)
    }
}

impl From<String> for FirestoreValue {
    fn from(value: String) -> Self {
        Self::from_string(value)
    }
}

impl From<bool> for FirestoreValue {
    fn from(value: bool) -> Self {
        Self::from_bool(value)
    }
}

impl From<i64> for FirestoreValue {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl From<i32> for FirestoreValue {
    fn from(value: i32) -> Self {
        Self::from_integer(value.into())
    }
}

impl From<u32> for FirestoreValue {
    fn from(value: u32) -> Self {
        Self::from_integer(value.into())
    }
}

impl From<f64> for FirestoreValue {
    fn from(value: f64) -> Self {
        Self::from_double(value)
    }
}

impl From<Timestamp> for FirestoreValue {
    fn from(value: Timestamp) -> Self {
        Self::from_timestamp(value)
    }
}

impl From<GeoPoint> for FirestoreValue {
    fn from(value: GeoPoint) -> Self {
        Self::from_geo_point(value)
    }
}

impl From<BytesValue> for FirestoreValue {
    fn from(value: BytesValue) -> Self {
        Self::from_bytes(value)
    }
}

impl From<BTreeMap<String, FirestoreValue>> for FirestoreValue {
    fn from(value: BTreeMap<String, FirestoreValue>) -> Self {
        Self::from_map(value)
    }
}

impl From<JsonValue> for FirestoreValue {
    fn from(value: JsonValue) -> Self {
        Self::from_native(&value)
    }
}

impl From<&JsonValue> for FirestoreValue {
    fn from(value: &JsonValue) -> Self {
        Self::from_native(value)
    }
}

impl<T> From<Vec<T>> for FirestoreValue
where
    T: Into<FirestoreValue>,
{
    fn from(values: Vec<T>) -> Self {
        Self::from_array(values.into_iter().map(Into::into).collect())
    }
}

impl<T> From<Option<T>> for FirestoreValue
where
    T: Into<FirestoreValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_else(Self::null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_numbers_pick_integer_or_double() {
        assert_eq!(
            FirestoreValue::from_native(&json!(42)).kind(),
            &ValueKind::Integer(42)
        );
        assert_eq!(
            FirestoreValue::from_native(&json!(1.5)).kind(),
            &ValueKind::Double(1.5)
        );
    }

    #[test]
    fn integers_beyond_i64_become_doubles() {
        let value = FirestoreValue::from_native(&json!(u64::MAX));
        assert!(matches!(value.kind(), ValueKind::Double(_)));
        assert_eq!(value.to_native(), json!(u64::MAX as f64));

        let edge = FirestoreValue::from_native(&json!(i64::MAX));
        assert_eq!(edge.kind(), &ValueKind::Integer(i64::MAX));
    }

    #[test]
    fn booleans_and_null_are_not_dropped() {
        assert_eq!(
            FirestoreValue::from_native(&json!(true)).kind(),
            &ValueKind::Boolean(true)
        );
        assert_eq!(
            FirestoreValue::from_native(&JsonValue::Null).kind(),
            &ValueKind::Null
        );
    }

    #[test]
    fn nested_native_values_roundtrip() {
        let native = json!({
            "name": "Ada",
            "tags": ["math", 1815, { "deep": [true, null] }],
            "profile": { "age": 36, "ratio": 0.25 }
        });
        let value = FirestoreValue::from_native(&native);
        assert_eq!(value.to_native(), native);
    }

    #[test]
    fn conversions_from_rust_types() {
        let value: FirestoreValue = vec!["a", "b"].into();
        assert_eq!(value.to_native(), json!(["a", "b"]));

        let missing: FirestoreValue = Option::<i64>::None.into();
        assert_eq!(missing.kind(), &ValueKind::Null);

        let timestamp = FirestoreValue::from(Timestamp::new(0, 0));
        assert_eq!(timestamp.to_native(), json!("1970-01-01T00:00:00Z"));
    }

    #[test]
    fn non_finite_double_renders_as_null() {
        assert_eq!(FirestoreValue::from_double(f64::NAN).to_native(), JsonValue::Null);
    }
}
