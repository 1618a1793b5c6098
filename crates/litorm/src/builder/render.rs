//! Clause renderers shared by the dialects.

use super::query::Query;
use crate::literal::{in_list, join_value, literal};
use crate::value::{Payload, Value};

/// Column quoting style.
pub(crate) type QuoteFn = fn(&str) -> String;

pub(crate) fn plain(column: &str) -> String {
    column.to_string()
}

pub(crate) fn backtick(column: &str) -> String {
    format!("`{}`", column)
}

/// ` t.a, t.b, t1.c` (`t.*` when no fields were requested).
pub(crate) fn fields(query: &Query) -> String {
    let base = query.base_alias();
    let mut out: Vec<String> = if query.fields.is_empty() {
        vec![format!("{}.*", base)]
    } else {
        query
            .fields
            .iter()
            .map(|f| format!("{}.{}", base, f))
            .collect()
    };
    for clause in &query.joins {
        for f in &clause.join.fields {
            out.push(format!("{}.{}", clause.alias, f));
        }
    }
    format!(" {}", out.join(", "))
}

/// ` users as t` or ` users`.
pub(crate) fn table(query: &Query, alias: bool) -> String {
    if alias {
        format!(" {} as {}", query.table, query.base_alias())
    } else {
        format!(" {}", query.table)
    }
}

pub(crate) fn from(query: &Query, alias: bool) -> String {
    format!(" FROM{}", table(query, alias))
}

/// ` LEFT JOIN statuses AS t1 ON t1.id = t.status_id ...`
pub(crate) fn joins(query: &Query) -> String {
    let base = query.base_alias();
    let mut sql = String::new();
    for clause in &query.joins {
        let j = &clause.join;
        sql.push_str(&format!(
            " {} JOIN {} AS {} ON ",
            j.join_type, j.source, clause.alias
        ));
        if j.on.is_empty() {
            sql.push_str(&format!(
                "{}.{} = {}.{}",
                clause.alias, j.key, base, j.target_key
            ));
            continue;
        }
        let conditions: Vec<String> = j
            .on
            .iter()
            .map(|on| {
                let left = match on.source.as_deref() {
                    Some(source) => query.aliases.resolve(source),
                    None => base,
                };
                match &on.value {
                    Some(value) => format!("{}.{}{}", left, on.source_key, join_value(value)),
                    None => format!("{}.{}={}.{}", left, on.source_key, clause.alias, on.join_key),
                }
            })
            .collect();
        sql.push_str(&conditions.join(" AND "));
    }
    sql
}

/// ` WHERE t.a=1 AND t.b IN (1,2)`.
///
/// Keys that already carry a comparison (`=`, `<`, `>`) get no extra operator.
pub(crate) fn where_clause(query: &Query, alias: bool) -> String {
    if query.filter.is_empty() {
        return String::new();
    }
    let prefix = if alias {
        format!("{}.", query.base_alias())
    } else {
        String::new()
    };
    let predicates: Vec<String> = query
        .filter
        .iter()
        .map(|(key, value)| predicate(&prefix, key, value))
        .collect();
    format!(" WHERE {}", predicates.join(" AND "))
}

fn predicate(prefix: &str, key: &str, value: &Value) -> String {
    if value.is_list() {
        return match in_list(value) {
            Some(list) => format!("{}{}{}", prefix, key, list),
            None => "1=0".to_string(),
        };
    }
    let has_operator = key.contains(['=', '<', '>']);
    if has_operator {
        return format!("{}{}{}", prefix, key, literal(value));
    }
    if value.is_null() {
        return format!("{}{} IS NULL", prefix, key);
    }
    format!("{}{}={}", prefix, key, literal(value))
}

/// ` ORDER BY t.name ASC,t.id DESC`.
pub(crate) fn order_by(query: &Query) -> String {
    if query.order.is_empty() {
        return String::new();
    }
    let base = query.base_alias();
    let items: Vec<String> = query
        .order
        .iter()
        .map(|o| {
            let mut item = if o.order_by.contains('.') {
                o.order_by.clone()
            } else {
                format!("{}.{}", base, o.order_by)
            };
            if o.asc {
                item.push_str(" ASC");
            }
            if o.desc {
                item.push_str(" DESC");
            }
            item
        })
        .collect();
    format!(" ORDER BY {}", items.join(","))
}

/// ` LIMIT n OFFSET m` when a limit is set.
pub(crate) fn limit_offset(query: &Query) -> String {
    if query.limit == 0 {
        return String::new();
    }
    format!(" LIMIT {} OFFSET {}", query.limit, query.offset)
}

/// `(a,b) VALUES (1,'x')`
pub(crate) fn columns_values(payload: &Payload, quote: QuoteFn) -> String {
    let columns: Vec<String> = payload.keys().map(|k| quote(k)).collect();
    let values: Vec<String> = payload.values().map(literal).collect();
    format!("({}) VALUES ({})", columns.join(","), values.join(","))
}

/// `a = 1, b = 'x'`
pub(crate) fn assignments(payload: &Payload, quote: QuoteFn) -> String {
    payload
        .iter()
        .map(|(k, v)| format!("{} = {}", quote(k), literal(v)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// ` SET a = 1, ...`, only rendered together with a WHERE map so that an
/// unfiltered UPDATE never becomes valid SQL.
pub(crate) fn setter(query: &Query, quote: QuoteFn) -> String {
    if query.filter.is_empty() {
        return String::new();
    }
    format!(" SET {}", assignments(&query.values, quote))
}
