use crate::builder::OrderParam;
use crate::value::{QueryMap, Value};

/// Rows returned by `find` when no limit is requested.
pub const DEFAULT_LIMIT: i64 = 100;

/// Shape of a `find`: projection, paging and ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Modificator {
    /// Explicit projection; empty means every model column.
    pub fields: Vec<String>,
    pub skip: i64,
    /// Zero means [`DEFAULT_LIMIT`].
    pub limit: i64,
    pub order_by: Vec<OrderParam>,
}

impl Modificator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn skip(mut self, skip: i64) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn order(mut self, order: OrderParam) -> Self {
        self.order_by.push(order);
        self
    }

    /// Limit actually applied.
    pub fn effective_limit(&self) -> i64 {
        if self.limit == 0 {
            DEFAULT_LIMIT
        } else {
            self.limit
        }
    }

    /// Parse an already-extracted parameter map.
    ///
    /// Recognised keys: `fields` (list or comma-separated text), `skip`,
    /// `limit` (integers or numeric text), `orderBy` and `order`. `order` equal
    /// to `"asc"` sorts ascending; anything else sorts descending. Unknown keys
    /// and unusable values are ignored.
    pub fn from_params(params: &QueryMap) -> Self {
        let mut m = Modificator::default();

        match params.get("fields") {
            Some(Value::StrList(fields)) => m.fields = fields.clone(),
            Some(Value::Str(fields)) => {
                m.fields = fields
                    .split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(String::from)
                    .collect();
            }
            _ => {}
        }
        if let Some(skip) = params.get("skip").and_then(int_param) {
            m.skip = skip;
        }
        if let Some(limit) = params.get("limit").and_then(int_param) {
            m.limit = limit;
        }
        if let Some(Value::Str(column)) = params.get("orderBy") {
            let asc = matches!(params.get("order"), Some(Value::Str(o)) if o == "asc");
            m.order_by.push(if asc {
                OrderParam::asc(column.as_str())
            } else {
                OrderParam::desc(column.as_str())
            });
        }
        m
    }
}

fn int_param(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Str(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values;

    #[test]
    fn parses_all_keys() {
        let m = Modificator::from_params(&values! {
            "fields" => vec!["id", "name"],
            "skip" => 20,
            "limit" => "10",
            "orderBy" => "name",
            "order" => "asc",
        });
        assert_eq!(m.fields, vec!["id", "name"]);
        assert_eq!(m.skip, 20);
        assert_eq!(m.limit, 10);
        assert_eq!(m.order_by, vec![OrderParam::asc("name")]);
    }

    #[test]
    fn order_defaults_to_desc() {
        let m = Modificator::from_params(&values! { "orderBy" => "created_at" });
        assert_eq!(m.order_by, vec![OrderParam::desc("created_at")]);

        let m = Modificator::from_params(&values! { "orderBy" => "id", "order" => "ASC" });
        assert_eq!(m.order_by, vec![OrderParam::desc("id")]);
    }

    #[test]
    fn empty_params_use_default_limit() {
        let m = Modificator::from_params(&values! {});
        assert_eq!(m, Modificator::default());
        assert_eq!(m.effective_limit(), DEFAULT_LIMIT);
        assert_eq!(Modificator::new().limit(5).effective_limit(), 5);
    }

    #[test]
    fn comma_separated_fields() {
        let m = Modificator::from_params(&values! { "fields" => "id, name,," });
        assert_eq!(m.fields, vec!["id", "name"]);
    }
}
