//! Cache Value Module
//!
//! Tagged payload stored under a cache key. Only records and lists can be
//! mutated in place; scalars are opaque.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Value ==
/// Payload held by a cache entry.
///
/// Serialized untagged: records as maps, lists as sequences, scalars as
/// plain JSON. Deserialization tries record, then list, then scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheValue {
    /// Property map patched by `update_property`
    Record(BTreeMap<String, CacheValue>),
    /// Ordered sequence mutated by `add_to_array` / `remove_from_array`
    List(Vec<CacheValue>),
    /// Opaque non-container JSON value the cache never looks inside.
    ///
    /// A JSON object or array placed here is converted to `Record` / `List`
    /// by [`CacheValue::normalized`], which every cache write applies.
    Scalar(Value),
}

// == Value Kind ==
/// Shape of a [`CacheValue`], reported in type mismatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Scalar,
    Record,
    List,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Scalar => "scalar",
            ValueKind::Record => "record",
            ValueKind::List => "list",
        };
        f.write_str(name)
    }
}

impl CacheValue {
    /// Creates a record holding a single property.
    pub fn record_with(property: impl Into<String>, value: CacheValue) -> Self {
        let mut map = BTreeMap::new();
        map.insert(property.into(), value);
        CacheValue::Record(map)
    }

    /// Returns the shape of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            CacheValue::Scalar(_) => ValueKind::Scalar,
            CacheValue::Record(_) => ValueKind::Record,
            CacheValue::List(_) => ValueKind::List,
        }
    }

    pub fn as_record(&self) -> Option<&BTreeMap<String, CacheValue>> {
        match self {
            CacheValue::Record(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[CacheValue]> {
        match self {
            CacheValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Converts back into a plain JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            CacheValue::Scalar(v) => v.clone(),
            CacheValue::Record(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            CacheValue::List(items) => {
                Value::Array(items.iter().map(CacheValue::to_json).collect())
            }
        }
    }

    /// Rewrites scalars holding JSON objects or arrays into records and
    /// lists, recursively.
    pub fn normalized(self) -> Self {
        match self {
            CacheValue::Scalar(value @ (Value::Object(_) | Value::Array(_))) => {
                CacheValue::from(value)
            }
            CacheValue::Scalar(value) => CacheValue::Scalar(value),
            CacheValue::Record(map) => CacheValue::Record(
                map.into_iter()
                    .map(|(k, v)| (k, v.normalized()))
                    .collect(),
            ),
            CacheValue::List(items) => {
                CacheValue::List(items.into_iter().map(CacheValue::normalized).collect())
            }
        }
    }
}

// == Conversions ==
impl From<Value> for CacheValue {
    /// Normalizes JSON objects to records and arrays to lists, recursively.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => CacheValue::Record(
                map.into_iter()
                    .map(|(k, v)| (k, CacheValue::from(v)))
                    .collect(),
            ),
            Value::Array(items) => {
                CacheValue::List(items.into_iter().map(CacheValue::from).collect())
            }
            other => CacheValue::Scalar(other),
        }
    }
}

impl From<Vec<CacheValue>> for CacheValue {
    fn from(items: Vec<CacheValue>) -> Self {
        CacheValue::List(items)
    }
}

impl From<BTreeMap<String, CacheValue>> for CacheValue {
    fn from(map: BTreeMap<String, CacheValue>) -> Self {
        CacheValue::Record(map)
    }
}

macro_rules! scalar_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for CacheValue {
                fn from(value: $ty) -> Self {
                    CacheValue::Scalar(Value::from(value))
                }
            }
        )*
    };
}

scalar_from!(&str, String, bool, i32, i64, u32, u64, usize, f64);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_normalizes_shapes() {
        let value = CacheValue::from(json!({
            "user": "ana",
            "tags": ["a", "b"],
        }));

        let record = value.as_record().expect("object becomes record");
        assert_eq!(record["user"], CacheValue::from("ana"));
        assert_eq!(
            record["tags"],
            CacheValue::List(vec![CacheValue::from("a"), CacheValue::from("b")])
        );
    }

    #[test]
    fn test_kind() {
        assert_eq!(CacheValue::from(5).kind(), ValueKind::Scalar);
        assert_eq!(CacheValue::from(json!({})).kind(), ValueKind::Record);
        assert_eq!(CacheValue::from(json!([])).kind(), ValueKind::List);
        assert_eq!(CacheValue::from(json!(null)).kind(), ValueKind::Scalar);
    }

    #[test]
    fn test_to_json_inverts_from_json() {
        let original = json!({"p": 5, "items": [1, {"q": true}], "name": "x"});
        assert_eq!(CacheValue::from(original.clone()).to_json(), original);
    }

    #[test]
    fn test_serde_untagged_layout() {
        let value = CacheValue::record_with("p", CacheValue::from(5));
        let encoded = serde_json::to_string(&value).unwrap();
        assert_eq!(encoded, r#"{"p":5}"#);

        let decoded: CacheValue = serde_json::from_str(r#"{"p":[1,"two"]}"#).unwrap();
        assert_eq!(
            decoded,
            CacheValue::record_with(
                "p",
                CacheValue::List(vec![CacheValue::from(1), CacheValue::from("two")])
            )
        );
    }

    #[test]
    fn test_normalized_unwraps_container_scalars() {
        let raw = CacheValue::List(vec![CacheValue::Scalar(json!({"a": [1, 2]}))]);
        let normalized = raw.normalized();

        assert_eq!(normalized, CacheValue::from(json!([{"a": [1, 2]}])));
        assert_eq!(normalized.as_list().unwrap()[0].kind(), ValueKind::Record);

        let encoded = serde_json::to_string(&normalized).unwrap();
        let decoded: CacheValue = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, normalized);
    }

    #[test]
    fn test_normalized_keeps_plain_scalars() {
        assert_eq!(CacheValue::Scalar(json!("x")).normalized(), CacheValue::from("x"));
    }

    #[test]
    fn test_from_usize() {
        assert_eq!(CacheValue::from(3usize).to_json(), json!(3));
    }

    #[test]
    fn test_record_with() {
        let value = CacheValue::record_with("p", CacheValue::from(5));
        assert_eq!(value.to_json(), json!({"p": 5}));
    }
}
