use serde::Serialize;
use serde_json::{map, Map, Value};

/// Single-level view of a nested payload: synthesized path key to scalar leaf.
///
/// Only produced by [`Flattener`](crate::service::flatten::Flattener); keys
/// keep the order in which their leaves were visited.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FlattenedRecord(Map<String, Value>);

impl FlattenedRecord {
    pub(crate) fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> map::Iter<'_> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<FlattenedRecord> for Value {
    fn from(record: FlattenedRecord) -> Self {
        Value::Object(record.0)
    }
}

impl<'a> IntoIterator for &'a FlattenedRecord {
    type Item = (&'a String, &'a Value);
    type IntoIter = map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for FlattenedRecord {
    type Item = (String, Value);
    type IntoIter = map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
