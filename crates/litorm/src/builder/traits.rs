use super::mysql::MySqlQueryBuilder;
use super::postgres::PostgresQueryBuilder;
use super::query::{Query, QueryType};
use std::fmt;

/// Per-dialect SQL renderer.
///
/// Rendering is a pure function of the [`Query`] state: no method mutates it and
/// building twice yields the same text.
pub trait QueryBuilder: Send + Sync {
    fn build_select(&self, query: &Query) -> String;

    fn build_insert(&self, query: &Query) -> String;

    /// INSERT followed by the ON CONFLICT clause (when fully configured).
    fn build_upsert(&self, query: &Query) -> String;

    fn build_update(&self, query: &Query) -> String;

    fn build_delete(&self, query: &Query) -> String;

    /// Dispatch on the active query type. Nothing is rendered when none is set.
    fn build(&self, query: &Query) -> String {
        match query.query_type {
            Some(QueryType::Select) => self.build_select(query),
            Some(QueryType::Insert) => self.build_insert(query),
            Some(QueryType::Upsert) => self.build_upsert(query),
            Some(QueryType::Update) => self.build_update(query),
            Some(QueryType::Delete) => self.build_delete(query),
            None => String::new(),
        }
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    MySql,
}

impl Dialect {
    /// The renderer for this dialect.
    pub fn query_builder(self) -> &'static dyn QueryBuilder {
        match self {
            Dialect::Postgres => &PostgresQueryBuilder,
            Dialect::MySql => &MySqlQueryBuilder,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Postgres => f.write_str("postgres"),
            Dialect::MySql => f.write_str("mysql"),
        }
    }
}
