use std::collections::BTreeMap;

use crate::firestore::value::FirestoreValue;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct MapValue {
    fields: BTreeMap<String, FirestoreValue>,
}

impl MapValue {
    pub fn new(fields: BTreeMap<String, FirestoreValue>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &BTreeMap<String, FirestoreValue> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&FirestoreValue> {
        self.fields.get(key)
    }

    pub fn into_fields(self) -> BTreeMap<String, FirestoreValue> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_entries() {
        let mut map = BTreeMap::new();
        map.insert("score".to_string(), FirestoreValue::from_integer(7));
        let value = MapValue::new(map);
        assert_eq!(value.get("score"), Some(&FirestoreValue::from_integer(7)));
        assert!(value.get("missing").is_none());
    }
}
