//! Model metadata and row population.
//!
//! `#[derive(Model)]` generates a static [`ModelDescriptor`] and a `from_row`
//! that coerces each column through [`FromValue`]. Coercion never fails: a
//! missing, `NULL` or unconvertible value leaves the field at its default.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::value::{Payload, Row, Value};

/// Declared kind of a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Float,
    Bool,
    Str,
    Timestamp,
    Uuid,
    Bytes,
}

/// Value generator for fields filled in on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    UuidV4,
}

impl Generator {
    pub fn generate(self) -> Value {
        match self {
            Generator::UuidV4 => Value::Str(Uuid::new_v4().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Rust field name.
    pub name: &'static str,
    /// Column name (`#[orm(column = "...")]` or the field name).
    pub column: &'static str,
    pub kind: FieldKind,
    /// `#[orm(key)]`
    pub key: bool,
    /// `#[orm(uuid)]`
    pub uuid: bool,
}

/// Per-model column metadata, built at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub name: &'static str,
    pub fields: &'static [FieldDescriptor],
}

impl ModelDescriptor {
    /// Column names in declaration order; the default SELECT projection.
    pub fn column_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.column.to_string()).collect()
    }

    /// Column of the first field tagged `key`.
    pub fn primary_key(&self) -> Option<&'static str> {
        self.fields.iter().find(|f| f.key).map(|f| f.column)
    }

    /// Primary key column, falling back to `id`.
    pub fn key_or_id(&self) -> &'static str {
        self.primary_key().unwrap_or("id")
    }

    /// Columns whose value is generated on create.
    pub fn generated_fields(&self) -> Vec<(&'static str, Generator)> {
        self.fields
            .iter()
            .filter(|f| f.uuid)
            .map(|f| (f.column, Generator::UuidV4))
            .collect()
    }

    pub fn field(&self, column: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.column == column)
    }

    /// Insert generated values for columns the payload does not already carry.
    pub fn fill_generated(&self, payload: &mut Payload) {
        for (column, generator) in self.generated_fields() {
            if !payload.contains_key(column) {
                payload.insert(column.to_string(), generator.generate());
            }
        }
    }
}

/// A struct that maps to one table.
pub trait Model: Sized + Send + Sync + 'static {
    fn descriptor() -> &'static ModelDescriptor;

    /// Populate an instance from a decoded row.
    fn from_row(row: &Row) -> Self;
}

/// Lenient conversion from a decoded [`Value`].
///
/// Returns `None` when the value cannot be coerced; callers fall back to
/// `Default`.
pub trait FromValue: Sized + Default {
    const KIND: FieldKind;

    fn from_value(value: &Value) -> Option<Self>;
}

/// Read `column` from `row` as `T`, defaulting when absent or unconvertible.
pub fn field<T: FromValue>(row: &Row, column: &str) -> T {
    match row.get(column) {
        Some(Value::Null) | None => T::default(),
        Some(value) => T::from_value(value).unwrap_or_default(),
    }
}

impl FromValue for i64 {
    const KIND: FieldKind = FieldKind::Int;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(*f as i64),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    const KIND: FieldKind = FieldKind::Int;

    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|i| i32::try_from(i).ok())
    }
}

impl FromValue for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    const KIND: FieldKind = FieldKind::Float;

    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl FromValue for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for String {
    const KIND: FieldKind = FieldKind::Str;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Timestamp(ts) => Some(ts.to_rfc3339()),
            Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            _ => None,
        }
    }
}

impl FromValue for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::Timestamp;

    /// Unix seconds (integer or numeric string), RFC 3339 text, or a typed
    /// timestamp. Anything else is the epoch.
    fn from_value(value: &Value) -> Option<Self> {
        let parsed = match value {
            Value::Timestamp(ts) => Some(*ts),
            Value::Int(secs) => Utc.timestamp_opt(*secs, 0).single(),
            Value::Str(s) => match s.trim().parse::<i64>() {
                Ok(secs) => Utc.timestamp_opt(secs, 0).single(),
                Err(_) => DateTime::parse_from_rfc3339(s.trim())
                    .ok()
                    .map(|ts| ts.with_timezone(&Utc)),
            },
            _ => None,
        };
        Some(parsed.unwrap_or_default())
    }
}

impl FromValue for Uuid {
    const KIND: FieldKind = FieldKind::Uuid;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => Uuid::parse_str(s).ok(),
            Value::Bytes(b) => Uuid::from_slice(b).ok(),
            _ => None,
        }
    }
}

impl FromValue for Vec<u8> {
    const KIND: FieldKind = FieldKind::Bytes;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bytes(b) => Some(b.clone()),
            Value::Str(s) => Some(s.as_bytes().to_vec()),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values;

    static FIELDS: [FieldDescriptor; 3] = [
        FieldDescriptor {
            name: "user_id",
            column: "id",
            kind: FieldKind::Int,
            key: true,
            uuid: false,
        },
        FieldDescriptor {
            name: "token",
            column: "token",
            kind: FieldKind::Str,
            key: false,
            uuid: true,
        },
        FieldDescriptor {
            name: "name",
            column: "name",
            kind: FieldKind::Str,
            key: false,
            uuid: false,
        },
    ];

    static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
        name: "User",
        fields: &FIELDS,
    };

    #[test]
    fn descriptor_metadata() {
        assert_eq!(DESCRIPTOR.column_names(), vec!["id", "token", "name"]);
        assert_eq!(DESCRIPTOR.primary_key(), Some("id"));
        assert_eq!(DESCRIPTOR.generated_fields(), vec![("token", Generator::UuidV4)]);
        assert_eq!(DESCRIPTOR.field("name").map(|f| f.name), Some("name"));

        let keyless = ModelDescriptor {
            name: "Log",
            fields: &[],
        };
        assert_eq!(keyless.primary_key(), None);
        assert_eq!(keyless.key_or_id(), "id");
    }

    #[test]
    fn fill_generated_keeps_existing_values() {
        let mut payload = values! { "token" => "fixed" };
        DESCRIPTOR.fill_generated(&mut payload);
        assert_eq!(payload["token"], Value::from("fixed"));

        let mut payload = values! { "name" => "a" };
        DESCRIPTOR.fill_generated(&mut payload);
        let token = payload["token"].as_str().unwrap_or_default();
        assert!(Uuid::parse_str(token).is_ok());
    }

    #[test]
    fn integer_coercion() {
        assert_eq!(i64::from_value(&Value::Int(7)), Some(7));
        assert_eq!(i64::from_value(&Value::Float(7.9)), Some(7));
        assert_eq!(i64::from_value(&Value::from("42")), Some(42));
        assert_eq!(i64::from_value(&Value::Bool(true)), None);
        assert_eq!(i32::from_value(&Value::Int(i64::MAX)), None);
    }

    #[test]
    fn float_coercion() {
        assert_eq!(f64::from_value(&Value::Int(3)), Some(3.0));
        assert_eq!(f64::from_value(&Value::from("2.5")), Some(2.5));
        assert_eq!(f32::from_value(&Value::Float(1.5)), Some(1.5));
    }

    #[test]
    fn bool_accepts_only_bool() {
        assert_eq!(bool::from_value(&Value::Bool(true)), Some(true));
        assert_eq!(bool::from_value(&Value::Int(1)), None);
        assert_eq!(bool::from_value(&Value::from("true")), None);
    }

    #[test]
    fn timestamp_coercion() {
        let expected = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(
            DateTime::<Utc>::from_value(&Value::Int(1_700_000_000)),
            Some(expected)
        );
        assert_eq!(
            DateTime::<Utc>::from_value(&Value::from("1700000000")),
            Some(expected)
        );
        assert_eq!(
            DateTime::<Utc>::from_value(&Value::from("2023-11-14T22:13:20Z")),
            Some(expected)
        );
        assert_eq!(
            DateTime::<Utc>::from_value(&Value::from("yesterday")),
            Some(DateTime::<Utc>::default())
        );
    }

    #[test]
    fn field_defaults_on_missing_or_null() {
        let row = values! { "a" => 1, "n" => None::<i64>, "s" => "x" };
        assert_eq!(field::<i64>(&row, "a"), 1);
        assert_eq!(field::<i64>(&row, "n"), 0);
        assert_eq!(field::<i64>(&row, "missing"), 0);
        assert_eq!(field::<bool>(&row, "s"), false);
        assert_eq!(field::<Option<String>>(&row, "n"), None);
        assert_eq!(field::<Option<String>>(&row, "s"), Some("x".to_string()));
    }
}
