use crate::firestore::value::FirestoreValue;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ArrayValue {
    values: Vec<FirestoreValue>,
}

impl ArrayValue {
    pub fn new(values: Vec<FirestoreValue>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[FirestoreValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<FirestoreValue> {
        self.values
    }
}

impl FromIterator<FirestoreValue> for ArrayValue {
    fn from_iter<I: IntoIterator<Item = FirestoreValue>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
