use std::collections::BTreeMap;
use std::str::FromStr;

use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::firestore::error::{decode_error, FirestoreResult};
use crate::firestore::model::{GeoPoint, Timestamp};
use crate::firestore::value::{BytesValue, FirestoreValue, ValueKind};

/// Encodes a value into its tagged wire form, e.g. `{"stringValue": "x"}`.
pub fn encode_value(value: &FirestoreValue) -> JsonValue {
    match value.kind() {
        ValueKind::Null => json!({ "nullValue": JsonValue::Null }),
        ValueKind::Boolean(boolean) => json!({ "booleanValue": boolean }),
        ValueKind::Integer(integer) => json!({ "integerValue": integer.to_string() }),
        ValueKind::Double(double) => json!({ "doubleValue": double }),
        ValueKind::Timestamp(timestamp) => json!({ "timestampValue": timestamp.to_rfc3339() }),
        ValueKind::String(string) => json!({ "stringValue": string }),
        ValueKind::Bytes(bytes) => json!({ "bytesValue": bytes.to_base64() }),
        ValueKind::Reference(reference) => json!({ "referenceValue": reference }),
        ValueKind::GeoPoint(point) => json!({
            "geoPointValue": {
                "latitude": point.latitude(),
                "longitude": point.longitude(),
            }
        }),
        ValueKind::Array(array) => {
            let values = array.values().iter().map(encode_value).collect::<Vec<_>>();
            json!({ "arrayValue": { "values": values } })
        }
        ValueKind::Map(map) => {
            let fields = map
                .fields()
                .iter()
                .map(|(key, value)| (key.clone(), encode_value(value)))
                .collect::<JsonMap<_, _>>();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

/// Encodes a native object into a wire `fields` map.
pub fn encode_fields(data: &JsonMap<String, JsonValue>) -> JsonValue {
    JsonValue::Object(
        data.iter()
            .map(|(key, value)| (key.clone(), encode_value(&FirestoreValue::from_native(value))))
            .collect(),
    )
}

/// Decodes a tagged wire value.
///
/// Returns `Ok(None)` when the tag is not one this crate understands, so the
/// caller can decide whether to drop or substitute it.
pub fn decode_value(value: &JsonValue) -> FirestoreResult<Option<FirestoreValue>> {
    let Some(object) = value.as_object() else {
        return Err(decode_error("Expected Firestore value object"));
    };

    if object.contains_key("nullValue") {
        return Ok(Some(FirestoreValue::null()));
    }
    if let Some(bool_value) = object.get("booleanValue") {
        let value = bool_value
            .as_bool()
            .ok_or_else(|| decode_error("booleanValue must be bool"))?;
        return Ok(Some(FirestoreValue::from_bool(value)));
    }
    if let Some(integer_value) = object.get("integerValue") {
        let parsed = match integer_value {
            JsonValue::String(value) => i64::from_str(value)
                .map_err(|err| decode_error(format!("Invalid integerValue {value:?}: {err}")))?,
            JsonValue::Number(number) => number
                .as_i64()
                .ok_or_else(|| decode_error("integerValue out of range"))?,
            _ => return Err(decode_error("integerValue must be a string or number")),
        };
        return Ok(Some(FirestoreValue::from_integer(parsed)));
    }
    if let Some(double_value) = object.get("doubleValue") {
        let parsed = match double_value {
            JsonValue::Number(number) => number
                .as_f64()
                .ok_or_else(|| decode_error("Invalid doubleValue"))?,
            // The REST API sends "NaN" and "Infinity" as strings.
            JsonValue::String(value) => value
                .parse::<f64>()
                .map_err(|err| decode_error(format!("Invalid doubleValue: {err}")))?,
            _ => return Err(decode_error("doubleValue must be a number or string")),
        };
        return Ok(Some(FirestoreValue::from_double(parsed)));
    }
    if let Some(timestamp_value) = object.get("timestampValue") {
        let raw = timestamp_value
            .as_str()
            .ok_or_else(|| decode_error("timestampValue must be string"))?;
        return Ok(Some(FirestoreValue::from_timestamp(
            Timestamp::parse_rfc3339(raw)?,
        )));
    }
    if let Some(string_value) = object.get("stringValue") {
        let raw = string_value
            .as_str()
            .ok_or_else(|| decode_error("stringValue must be string"))?;
        return Ok(Some(FirestoreValue::from_string(raw)));
    }
    if let Some(bytes_value) = object.get("bytesValue") {
        let raw = bytes_value
            .as_str()
            .ok_or_else(|| decode_error("bytesValue must be base64 string"))?;
        return Ok(Some(FirestoreValue::from_bytes(BytesValue::from_base64(raw)?)));
    }
    if let Some(reference_value) = object.get("referenceValue") {
        let raw = reference_value
            .as_str()
            .ok_or_else(|| decode_error("referenceValue must be string"))?;
        return Ok(Some(FirestoreValue::from_reference(raw)));
    }
    if let Some(geo_point) = object.get("geoPointValue") {
        // Proto3 JSON omits zero coordinates.
        let latitude = geo_point
            .get("latitude")
            .and_then(JsonValue::as_f64)
            .unwrap_or_default();
        let longitude = geo_point
            .get("longitude")
            .and_then(JsonValue::as_f64)
            .unwrap_or_default();
        let point = GeoPoint::new(latitude, longitude)
            .map_err(|err| decode_error(err.message().to_string()))?;
        return Ok(Some(FirestoreValue::from_geo_point(point)));
    }
    if let Some(array_value) = object.get("arrayValue") {
        let mut values = Vec::new();
        if let Some(entries) = array_value.get("values").and_then(JsonValue::as_array) {
            for entry in entries {
                values.push(decode_value(entry)?.unwrap_or_else(FirestoreValue::null));
            }
        }
        return Ok(Some(FirestoreValue::from_array(values)));
    }
    if let Some(map_value) = object.get("mapValue") {
        let mut fields = BTreeMap::new();
        if let Some(entries) = map_value.get("fields").and_then(JsonValue::as_object) {
            for (key, entry) in entries {
                if let Some(decoded) = decode_value(entry)? {
                    fields.insert(key.clone(), decoded);
                }
            }
        }
        return Ok(Some(FirestoreValue::from_map(fields)));
    }

    Ok(None)
}

/// Decodes a wire `fields` map into native JSON.
///
/// Fields carrying an unknown tag are dropped.
pub fn decode_fields(fields: &JsonValue) -> FirestoreResult<JsonMap<String, JsonValue>> {
    let mut decoded = JsonMap::new();
    let Some(entries) = fields.as_object() else {
        if fields.is_null() {
            return Ok(decoded);
        }
        return Err(decode_error("Expected 'fields' to be an object"));
    };

    for (key, value) in entries {
        match decode_value(value)? {
            Some(value) => {
                decoded.insert(key.clone(), value.to_native());
            }
            None => log::debug!("dropping field {key:?} with unsupported value type"),
        }
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native_map(value: JsonValue) -> JsonMap<String, JsonValue> {
        match value {
            JsonValue::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn encodes_scalars_with_wire_tags() {
        let encoded = encode_fields(&native_map(json!({
            "name": "Ada",
            "age": 36,
            "ratio": 0.5,
            "active": true,
            "nickname": null
        })));
        assert_eq!(
            encoded,
            json!({
                "name": { "stringValue": "Ada" },
                "age": { "integerValue": "36" },
                "ratio": { "doubleValue": 0.5 },
                "active": { "booleanValue": true },
                "nickname": { "nullValue": null }
            })
        );
    }

    #[test]
    fn encodes_nested_containers() {
        let encoded = encode_fields(&native_map(json!({
            "tags": ["a", 1],
            "profile": { "city": "London" }
        })));
        assert_eq!(
            encoded,
            json!({
                "tags": { "arrayValue": { "values": [
                    { "stringValue": "a" },
                    { "integerValue": "1" }
                ] } },
                "profile": { "mapValue": { "fields": {
                    "city": { "stringValue": "London" }
                } } }
            })
        );
    }

    #[test]
    fn fields_survive_encode_then_decode() {
        let data = native_map(json!({
            "name": "Ada",
            "age": 36,
            "score": 9.75,
            "active": false,
            "deleted": null,
            "matrix": [[1, 2], [3]],
            "rows": [{ "x": 1 }, { "x": 2 }],
            "empty": {}
        }));
        let decoded = decode_fields(&encode_fields(&data)).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn decodes_typed_values_to_native() {
        let decoded = decode_fields(&json!({
            "at": { "timestampValue": "2024-03-01T12:00:00.5Z" },
            "blob": { "bytesValue": "AQID" },
            "ref": { "referenceValue": "projects/p/databases/(default)/documents/users/ada" },
            "where": { "geoPointValue": { "latitude": 51.5, "longitude": -0.12 } },
            "origin": { "geoPointValue": {} }
        }))
        .unwrap();
        assert_eq!(decoded["at"], json!("2024-03-01T12:00:00.500Z"));
        assert_eq!(decoded["blob"], json!("AQID"));
        assert_eq!(
            decoded["ref"],
            json!("projects/p/databases/(default)/documents/users/ada")
        );
        assert_eq!(decoded["where"], json!({ "latitude": 51.5, "longitude": -0.12 }));
        assert_eq!(decoded["origin"], json!({ "latitude": 0.0, "longitude": 0.0 }));
    }

    #[test]
    fn map_without_fields_decodes_to_empty_object() {
        let decoded = decode_fields(&json!({ "meta": { "mapValue": {} } })).unwrap();
        assert_eq!(decoded["meta"], json!({}));
    }

    #[test]
    fn array_without_values_decodes_to_empty_array() {
        let decoded = decode_fields(&json!({ "list": { "arrayValue": {} } })).unwrap();
        assert_eq!(decoded["list"], json!([]));
    }

    #[test]
    fn unknown_tags_are_omitted() {
        let decoded = decode_fields(&json!({
            "kept": { "stringValue": "yes" },
            "odd": { "vectorValue": [1, 2] }
        }))
        .unwrap();
        assert_eq!(decoded.len(), 1);
        assert!(decoded.get("odd").is_none());
    }

    #[test]
    fn non_numeric_integer_is_a_decode_error() {
        let err = decode_fields(&json!({ "age": { "integerValue": "abc" } })).unwrap_err();
        assert_eq!(err.code_str(), "firestore/decode");
    }

    #[test]
    fn string_encoded_special_doubles_decode() {
        let value = decode_value(&json!({ "doubleValue": "Infinity" }))
            .unwrap()
            .unwrap();
        assert_eq!(value, FirestoreValue::from_double(f64::INFINITY));
    }

    #[test]
    fn missing_fields_decode_to_empty_map() {
        assert!(decode_fields(&JsonValue::Null).unwrap().is_empty());
    }
}
