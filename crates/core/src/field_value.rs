use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A draft's full set of fields, keyed by field name.
pub type Snapshot = BTreeMap<String, FieldValue>;

/// Value of one draft field.
///
/// Serialized untagged so a stored snapshot reads like the plain JSON
/// object the dashboard renders from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b).is_eq(),
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// True when the field holds nothing worth protecting behind a lock.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Map(map) => map.is_empty(),
            FieldValue::Boolean(_) | FieldValue::Integer(_) | FieldValue::Float(_) => false,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, FieldValue>> {
        match self {
            FieldValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(FieldValue::from).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (k, FieldValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Build a snapshot from `(field, value)` pairs.
pub fn snapshot<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Snapshot
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emptiness() {
        assert!(FieldValue::Null.is_empty());
        assert!(FieldValue::text("   ").is_empty());
        assert!(FieldValue::List(vec![]).is_empty());
        assert!(!FieldValue::text("2024-06-01").is_empty());
        assert!(!FieldValue::Integer(0).is_empty());
        assert!(!FieldValue::Boolean(false).is_empty());
    }

    #[test]
    fn json_shape_is_plain() {
        let snap = snapshot([("readyDekorasi", FieldValue::text("2024-06-01")), ("tenda", FieldValue::Integer(3))]);
        let json = serde_json::to_string(&snap).unwrap();
        assert_eq!(json, r#"{"readyDekorasi":"2024-06-01","tenda":3}"#);
    }

    #[test]
    fn json_decoding_picks_narrowest_variant() {
        let snap: Snapshot =
            serde_json::from_str(r#"{"a":null,"b":true,"c":7,"d":1.5,"e":"x","f":[1],"g":{"h":2}}"#).unwrap();
        assert_eq!(snap["a"], FieldValue::Null);
        assert_eq!(snap["b"], FieldValue::Boolean(true));
        assert_eq!(snap["c"], FieldValue::Integer(7));
        assert_eq!(snap["d"], FieldValue::Float(1.5));
        assert_eq!(snap["e"], FieldValue::text("x"));
        assert_eq!(snap["f"], FieldValue::List(vec![FieldValue::Integer(1)]));
        assert_eq!(snap["g"].as_map().and_then(|m| m.get("h")), Some(&FieldValue::Integer(2)));
    }

    #[test]
    fn from_json_value() {
        let value = FieldValue::from(serde_json::json!({"jumlah": 5000000, "metode": "transfer"}));
        let map = value.as_map().unwrap();
        assert_eq!(map["jumlah"], FieldValue::Integer(5_000_000));
        assert_eq!(map["metode"], FieldValue::text("transfer"));
    }
}
