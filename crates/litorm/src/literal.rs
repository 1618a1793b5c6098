//! SQL literal rendering.
//!
//! Every value that ends up inside generated SQL passes through this module.
//!
//! **Warning**: values are interpolated, not bound. Strings are wrapped in single
//! quotes and embedded quotes are *not* escaped, so untrusted input can break out
//! of the literal. Swapping this module for a placeholder-emitting variant is the
//! way to move to parameter binding.

use crate::value::Value;

/// Render a value as an SQL literal.
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => float(*f),
        Value::Str(s) => quote(s),
        Value::Bytes(b) => quote(&String::from_utf8_lossy(b)),
        Value::Timestamp(ts) => quote(&ts.to_rfc3339()),
        Value::IntList(_) | Value::FloatList(_) | Value::StrList(_) => {
            format!("({})", list_items(value).unwrap_or_default())
        }
    }
}

/// Render a list value as ` IN (...)`.
///
/// Returns `None` for scalars and for empty lists; an empty `IN ()` is not
/// valid SQL, so callers substitute an always-false predicate.
pub fn in_list(value: &Value) -> Option<String> {
    let items = list_items(value)?;
    if items.is_empty() {
        return None;
    }
    Some(format!(" IN ({})", items))
}

/// Render the right-hand side of a literal join condition.
pub fn join_value(value: &Value) -> String {
    match value {
        Value::Str(s) => format!("= {}", quote(s)),
        list if list.is_list() => in_list(list).unwrap_or_else(|| " IN (NULL)".to_string()),
        other => format!("={}", literal(other)),
    }
}

fn list_items(value: &Value) -> Option<String> {
    let items: Vec<String> = match value {
        Value::IntList(v) => v.iter().map(i64::to_string).collect(),
        Value::FloatList(v) => v.iter().map(|f| float(*f)).collect(),
        Value::StrList(v) => v.iter().map(|s| quote(s)).collect(),
        _ => return None,
    };
    Some(items.join(","))
}

fn float(f: f64) -> String {
    format!("{:.8}", f)
}

fn quote(s: &str) -> String {
    format!("'{}'", s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars() {
        assert_eq!(literal(&Value::Int(5)), "5");
        assert_eq!(literal(&Value::Float(1.5)), "1.50000000");
        assert_eq!(literal(&Value::Str("b".into())), "'b'");
        assert_eq!(literal(&Value::Bool(true)), "TRUE");
        assert_eq!(literal(&Value::Null), "NULL");
    }

    #[test]
    fn strings_are_not_escaped() {
        assert_eq!(literal(&Value::Str("O'Brien".into())), "'O'Brien'");
    }

    #[test]
    fn lists() {
        assert_eq!(in_list(&Value::IntList(vec![1, 2, 3])).unwrap(), " IN (1,2,3)");
        assert_eq!(
            in_list(&Value::StrList(vec!["a".into(), "b".into()])).unwrap(),
            " IN ('a','b')"
        );
        assert_eq!(
            in_list(&Value::FloatList(vec![0.5])).unwrap(),
            " IN (0.50000000)"
        );
        assert!(in_list(&Value::IntList(vec![])).is_none());
        assert!(in_list(&Value::Int(1)).is_none());
    }

    #[test]
    fn join_values() {
        assert_eq!(join_value(&Value::Str("active".into())), "= 'active'");
        assert_eq!(join_value(&Value::IntList(vec![1, 2])), " IN (1,2)");
        assert_eq!(join_value(&Value::Int(3)), "=3");
    }
}
