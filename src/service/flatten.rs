//! Flattening of nested JSON payloads into single-level records.
//!
//! Objects contribute their keys to the path, arrays their zero-based indices;
//! every scalar (including `null`) becomes one entry keyed by the joined path.
//!
//! ```
//! use earnings_calendar::flatten;
//! use serde_json::json;
//!
//! let flat = flatten(&json!({"a": {"b": 1, "c": [2, 3]}}));
//! assert_eq!(flat.get("a_b"), Some(&json!(1)));
//! assert_eq!(flat.get("a_c_1"), Some(&json!(3)));
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::FlattenedRecord;

/// Separator placed between path segments unless configured otherwise.
pub const DEFAULT_SEPARATOR: &str = "_";

#[derive(Debug, Clone)]
pub struct Flattener {
    separator: String,
}

impl Default for Flattener {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl Flattener {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    /// Flatten a decoded payload. A bare scalar maps to the empty key.
    pub fn flatten(&self, value: &Value) -> FlattenedRecord {
        let mut out = Map::new();
        let mut path = Vec::new();
        self.walk(value, &mut path, &mut out);
        FlattenedRecord::from_map(out)
    }

    /// Serialize `value` to JSON first, then flatten it.
    pub fn flatten_serialize<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<FlattenedRecord, serde_json::Error> {
        Ok(self.flatten(&serde_json::to_value(value)?))
    }

    fn walk(&self, value: &Value, path: &mut Vec<String>, out: &mut Map<String, Value>) {
        match value {
            Value::Object(fields) => {
                for (key, child) in fields {
                    path.push(key.clone());
                    self.walk(child, path, out);
                    path.pop();
                }
            }
            Value::Array(items) => {
                for (idx, child) in items.iter().enumerate() {
                    path.push(idx.to_string());
                    self.walk(child, path, out);
                    path.pop();
                }
            }
            leaf => {
                out.insert(path.join(&self.separator), leaf.clone());
            }
        }
    }
}

/// Flatten with the default `_` separator.
pub fn flatten(value: &Value) -> FlattenedRecord {
    Flattener::default().flatten(value)
}
