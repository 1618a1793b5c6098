//! Builder state: everything a statement is rendered from.

use crate::value::{Payload, QueryMap, Value};
use std::fmt;
use std::str::FromStr;

/// Prefix for generated table aliases (`t`, `t1`, `t2`, ...).
pub const TABLE_PREFIX: &str = "t";

/// The statement a builder renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    /// INSERT with an ON CONFLICT clause.
    Upsert,
    Update,
    Delete,
}

/// JOIN flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    #[default]
    Left,
    Right,
    Inner,
}

impl JoinType {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Inner => "INNER",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for JoinType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LEFT" => Ok(JoinType::Left),
            "RIGHT" => Ok(JoinType::Right),
            "INNER" => Ok(JoinType::Inner),
            other => Err(format!("unknown join type: {other}")),
        }
    }
}

/// One extra condition of a multi-condition join.
///
/// Renders as `<alias(source or base)>.<source_key>` followed either by a literal
/// comparison against `value` or by `=<join alias>.<join_key>`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JoinOn {
    /// Table the left-hand key belongs to; `None` means the base table.
    pub source: Option<String>,
    pub source_key: String,
    pub join_key: String,
    pub value: Option<Value>,
}

impl JoinOn {
    /// `<base>.<source_key> = <joined>.<join_key>`
    pub fn keys(source_key: impl Into<String>, join_key: impl Into<String>) -> Self {
        Self {
            source_key: source_key.into(),
            join_key: join_key.into(),
            ..Self::default()
        }
    }

    /// `<source>.<key>` compared against a literal.
    pub fn value(source: impl Into<String>, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            source: Some(source.into()),
            source_key: key.into(),
            join_key: String::new(),
            value: Some(value.into()),
        }
    }
}

/// A joined table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Join {
    /// Joined table.
    pub source: String,
    /// Column on the joined table.
    pub key: String,
    /// Column on the base table.
    pub target_key: String,
    /// Columns of the joined table added to the projection.
    pub fields: Vec<String>,
    pub join_type: JoinType,
    /// When non-empty, replaces the `key = target_key` condition.
    pub on: Vec<JoinOn>,
}

impl Join {
    pub fn new(
        source: impl Into<String>,
        key: impl Into<String>,
        target_key: impl Into<String>,
        join_type: JoinType,
    ) -> Self {
        Self {
            source: source.into(),
            key: key.into(),
            target_key: target_key.into(),
            join_type,
            ..Self::default()
        }
    }

    pub fn left(source: impl Into<String>, key: impl Into<String>, target_key: impl Into<String>) -> Self {
        Self::new(source, key, target_key, JoinType::Left)
    }

    pub fn inner(source: impl Into<String>, key: impl Into<String>, target_key: impl Into<String>) -> Self {
        Self::new(source, key, target_key, JoinType::Inner)
    }

    pub fn right(source: impl Into<String>, key: impl Into<String>, target_key: impl Into<String>) -> Self {
        Self::new(source, key, target_key, JoinType::Right)
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn on(mut self, on: JoinOn) -> Self {
        self.on.push(on);
        self
    }
}

/// A join together with the alias it was given.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join: Join,
    pub alias: String,
}

/// ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderParam {
    pub order_by: String,
    pub asc: bool,
    pub desc: bool,
}

impl OrderParam {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            order_by: column.into(),
            asc: true,
            desc: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            order_by: column.into(),
            asc: false,
            desc: true,
        }
    }
}

/// ON CONFLICT action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAction {
    Nothing,
    Update,
}

impl FromStr for ConflictAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NOTHING" => Ok(ConflictAction::Nothing),
            "UPDATE" => Ok(ConflictAction::Update),
            other => Err(format!("unknown conflict action: {other}")),
        }
    }
}

/// ON CONFLICT configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conflict {
    pub fields: Vec<String>,
    pub constraint: Option<String>,
    pub action: Option<ConflictAction>,
}

impl Conflict {
    /// A conflict clause needs an action and a target (constraint or fields).
    pub fn is_complete(&self) -> bool {
        self.action.is_some() && (self.constraint.is_some() || !self.fields.is_empty())
    }
}

/// Table → alias registry.
///
/// The base table is `t`; joins get `t1`, `t2`, ... in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Aliases {
    base: Option<String>,
    joins: Vec<(String, String)>,
}

impl Aliases {
    pub fn set_base(&mut self, table: &str) {
        self.base = Some(table.to_string());
    }

    /// Register a joined table and return its fresh alias.
    pub fn add_join(&mut self, source: &str) -> String {
        let alias = format!("{}{}", TABLE_PREFIX, self.joins.len() + 1);
        self.joins.push((source.to_string(), alias.clone()));
        alias
    }

    /// Latest alias registered for `source`; joins shadow the base table.
    pub fn get(&self, source: &str) -> Option<&str> {
        self.joins
            .iter()
            .rev()
            .find(|(table, _)| table == source)
            .map(|(_, alias)| alias.as_str())
            .or_else(|| self.base_for(source))
    }

    /// The alias of `source`, or `source` itself when it has none.
    pub fn resolve<'a>(&'a self, source: &'a str) -> &'a str {
        self.get(source).unwrap_or(source)
    }

    fn base_for(&self, source: &str) -> Option<&str> {
        match &self.base {
            Some(table) if table == source => Some(TABLE_PREFIX),
            _ => None,
        }
    }
}

/// Accumulated builder state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub query_type: Option<QueryType>,
    pub table: String,
    pub fields: Vec<String>,
    pub filter: QueryMap,
    pub joins: Vec<JoinClause>,
    pub order: Vec<OrderParam>,
    pub limit: i64,
    pub offset: i64,
    pub values: Payload,
    pub return_id: Option<String>,
    pub conflict: Conflict,
    pub aliases: Aliases,
}

impl Query {
    /// Alias of the base table (or the table name when none was assigned).
    pub fn base_alias(&self) -> &str {
        self.aliases.base_for(&self.table).unwrap_or(&self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_sequential() {
        let mut aliases = Aliases::default();
        aliases.set_base("users");
        assert_eq!(aliases.add_join("statuses"), "t1");
        assert_eq!(aliases.add_join("roles"), "t2");
        assert_eq!(aliases.add_join("statuses"), "t3");
        assert_eq!(aliases.resolve("users"), "t");
        assert_eq!(aliases.resolve("statuses"), "t3");
        assert_eq!(aliases.resolve("unknown"), "unknown");
    }

    #[test]
    fn self_join_keeps_base_alias() {
        let mut q = Query {
            table: "users".into(),
            ..Query::default()
        };
        q.aliases.set_base("users");
        assert_eq!(q.aliases.add_join("users"), "t1");
        assert_eq!(q.base_alias(), "t");
        assert_eq!(q.aliases.resolve("users"), "t1");
    }

    #[test]
    fn parse_case_insensitive() {
        assert_eq!("left".parse::<JoinType>().unwrap(), JoinType::Left);
        assert_eq!("Inner".parse::<JoinType>().unwrap(), JoinType::Inner);
        assert_eq!("update".parse::<ConflictAction>().unwrap(), ConflictAction::Update);
        assert!("replace".parse::<ConflictAction>().is_err());
    }

    #[test]
    fn conflict_completeness() {
        let mut c = Conflict::default();
        assert!(!c.is_complete());
        c.fields = vec!["email".into()];
        assert!(!c.is_complete());
        c.action = Some(ConflictAction::Nothing);
        assert!(c.is_complete());
    }
}
