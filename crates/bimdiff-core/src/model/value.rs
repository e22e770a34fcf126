//! Heterogeneous property values.
//!
//! Exported models attach open-ended attribute bags to elements. Values are
//! a recursive tagged union compared structurally: two objects are equal when
//! they hold the same keys with equal values, regardless of insertion order.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A single property value.
///
/// Deserializes from any JSON value. Numbers are held as `f64`; integral
/// numbers serialize back without a fractional part so `3` round-trips as `3`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<PropertyValue>),
    Object(BTreeMap<String, PropertyValue>),
}

/// Numbers compare by value; NaN equals NaN so that equality matches the
/// canonical serialized form and stays reflexive.
fn numbers_equal(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropertyValue::Null, PropertyValue::Null) => true,
            (PropertyValue::Bool(a), PropertyValue::Bool(b)) => a == b,
            (PropertyValue::Number(a), PropertyValue::Number(b)) => numbers_equal(*a, *b),
            (PropertyValue::String(a), PropertyValue::String(b)) => a == b,
            (PropertyValue::Array(a), PropertyValue::Array(b)) => a == b,
            (PropertyValue::Object(a), PropertyValue::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropertyValue::Null => serializer.serialize_unit(),
            PropertyValue::Bool(b) => serializer.serialize_bool(*b),
            PropertyValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            PropertyValue::String(s) => serializer.serialize_str(s),
            PropertyValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            PropertyValue::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "\"{}\"", s),
            other => match serde_json::to_string(other) {
                Ok(json) => f.write_str(&json),
                Err(_) => f.write_str("<unprintable>"),
            },
        }
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => PropertyValue::Null,
            serde_json::Value::Bool(b) => PropertyValue::Bool(b),
            serde_json::Value::Number(n) => PropertyValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => PropertyValue::String(s),
            serde_json::Value::Array(items) => {
                PropertyValue::Array(items.into_iter().map(PropertyValue::from).collect())
            }
            serde_json::Value::Object(entries) => PropertyValue::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, PropertyValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Number(value as f64)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Number(f64::from(value))
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(values: Vec<T>) -> Self {
        PropertyValue::Array(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_equality_ignores_key_order() {
        let a: PropertyValue = serde_json::from_str(r#"{"x":1,"y":[1,2,{"z":null}]}"#).unwrap();
        let b: PropertyValue = serde_json::from_str(r#"{"y":[1,2,{"z":null}],"x":1}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_array_order_is_significant() {
        let a = PropertyValue::from(vec![1, 2]);
        let b = PropertyValue::from(vec![2, 1]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_integer_and_float_forms_are_equal() {
        let a: PropertyValue = serde_json::from_str("3").unwrap();
        let b: PropertyValue = serde_json::from_str("3.0").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_variants_never_equal() {
        assert_ne!(PropertyValue::from("1"), PropertyValue::from(1));
        assert_ne!(PropertyValue::Null, PropertyValue::Bool(false));
    }

    #[test]
    fn test_nan_is_reflexive() {
        let v = PropertyValue::Number(f64::NAN);
        assert_eq!(v, v.clone());
    }

    #[test]
    fn test_integral_numbers_serialize_without_fraction() {
        let v = PropertyValue::from(json!({"h": 3, "w": 0.25, "tags": ["a", true, null]}));
        assert_eq!(
            serde_json::to_string(&v).unwrap(),
            r#"{"h":3,"tags":["a",true,null],"w":0.25}"#
        );
    }

    #[test]
    fn test_display_quotes_strings() {
        assert_eq!(PropertyValue::from("concrete").to_string(), "\"concrete\"");
        assert_eq!(PropertyValue::from(2.5).to_string(), "2.5");
    }
}
