//! Dynamic column values.
//!
//! Query maps, insert/update payloads and decoded rows all share one shape: a
//! column name → [`Value`] map. Maps are `BTreeMap`s so that generated SQL lists
//! columns in a stable, sorted order.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
    IntList(Vec<i64>),
    FloatList(Vec<f64>),
    StrList(Vec<String>),
}

/// Filter map: `column → value`, joined with `AND`.
pub type QueryMap = BTreeMap<String, Value>;

/// Insert/update payload: `column → value`.
pub type Payload = BTreeMap<String, Value>;

/// A decoded result row: `column → value`.
pub type Row = BTreeMap<String, Value>;

impl Value {
    /// Decode a raw driver value.
    ///
    /// Some drivers hand numeric columns back as raw bytes, so the bytes are
    /// parsed as a float first and only kept as text when that fails.
    pub fn from_driver_bytes(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        match text.trim().parse::<f64>() {
            Ok(f) => Value::Float(f),
            Err(_) => Value::Str(text.into_owned()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value renders as an `IN (...)` list.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Value::IntList(_) | Value::FloatList(_) | Value::StrList(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Str(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::IntList(v)
    }
}

impl From<Vec<i32>> for Value {
    fn from(v: Vec<i32>) -> Self {
        Value::IntList(v.into_iter().map(i64::from).collect())
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::FloatList(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::StrList(v)
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::StrList(v.into_iter().map(str::to_string).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Build a [`QueryMap`] / [`Payload`] / [`Row`] literal.
///
/// ```ignore
/// let q = litorm::values! { "id" => 5, "status" => "active" };
/// ```
#[macro_export]
macro_rules! values {
    () => {
        ::std::collections::BTreeMap::<::std::string::String, $crate::Value>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = ::std::collections::BTreeMap::<::std::string::String, $crate::Value>::new();
        $(
            map.insert(::std::string::String::from($key), $crate::Value::from($value));
        )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_bytes_prefer_numbers() {
        assert_eq!(Value::from_driver_bytes(b"12.50"), Value::Float(12.5));
        assert_eq!(Value::from_driver_bytes(b"7"), Value::Float(7.0));
        assert_eq!(
            Value::from_driver_bytes(b"hello"),
            Value::Str("hello".to_string())
        );
    }

    #[test]
    fn values_macro_builds_sorted_map() {
        let map = values! { "name" => "a", "id" => 5, "tags" => vec!["x", "y"] };
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["id", "name", "tags"]);
        assert_eq!(map["id"], Value::Int(5));
        assert!(map["tags"].is_list());
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Str("x".into()));
    }
}
