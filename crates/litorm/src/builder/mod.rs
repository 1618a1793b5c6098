//! Fluent, dialect-aware SQL builder.
//!
//! A [`Builder`] accumulates query parts through `&mut Self` mutators and renders
//! literal SQL through the [`QueryBuilder`] of its [`Dialect`].
//!
//! ```ignore
//! use litorm::{Builder, values};
//!
//! let sql = Builder::postgres()
//!     .select(Vec::<String>::new())
//!     .from("users")
//!     .filter(values! { "id" => 5 })
//!     .build();
//! assert_eq!(sql, "SELECT t.* FROM users as t WHERE t.id=5");
//! ```
//!
//! ## Design
//!
//! - Values are interpolated as literals (see [`crate::literal`]), not bound.
//! - The builder never fails; incomplete state renders incomplete SQL.
//! - One builder per statement. Aliases (`t`, `t1`, `t2`, ...) are assigned as
//!   tables are registered and never reused within a builder.

pub mod mysql;
pub mod postgres;
pub mod query;
pub(crate) mod render;
pub mod traits;

pub use mysql::MySqlQueryBuilder;
pub use postgres::PostgresQueryBuilder;
pub use query::{
    Aliases, Conflict, ConflictAction, Join, JoinClause, JoinOn, JoinType, OrderParam, Query,
    QueryType, TABLE_PREFIX,
};
pub use traits::{Dialect, QueryBuilder};

use crate::value::{Payload, QueryMap};

/// Stateful statement builder for one dialect.
#[derive(Debug, Clone)]
pub struct Builder {
    dialect: Dialect,
    query: Query,
}

impl Builder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            query: Query::default(),
        }
    }

    pub fn postgres() -> Self {
        Self::new(Dialect::Postgres)
    }

    pub fn mysql() -> Self {
        Self::new(Dialect::MySql)
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Current state.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// SELECT, appending `fields` to the projection (`*` when none end up set).
    pub fn select<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.query_type = Some(QueryType::Select);
        self.query.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// INSERT INTO `table`.
    pub fn insert(&mut self, table: &str) -> &mut Self {
        self.query.query_type = Some(QueryType::Insert);
        self.query.table = table.to_string();
        self
    }

    /// INSERT INTO `table` with an ON CONFLICT clause.
    pub fn save(&mut self, table: &str) -> &mut Self {
        self.query.query_type = Some(QueryType::Upsert);
        self.query.table = table.to_string();
        self
    }

    /// UPDATE `table`.
    pub fn update(&mut self, table: &str) -> &mut Self {
        self.query.query_type = Some(QueryType::Update);
        self.set_table(table);
        self
    }

    /// DELETE; the table comes from [`Builder::from`].
    pub fn delete(&mut self) -> &mut Self {
        self.query.query_type = Some(QueryType::Delete);
        self
    }

    /// Base table for SELECT/DELETE.
    pub fn from(&mut self, table: &str) -> &mut Self {
        self.set_table(table);
        self
    }

    /// Column values for INSERT/UPDATE.
    pub fn values(&mut self, data: Payload) -> &mut Self {
        self.query.values = data;
        self
    }

    /// Alias of [`Builder::values`].
    pub fn set(&mut self, data: Payload) -> &mut Self {
        self.values(data)
    }

    /// WHERE map; pairs are joined with `AND`.
    pub fn filter(&mut self, filter: QueryMap) -> &mut Self {
        self.query.filter = filter;
        self
    }

    /// Alias of [`Builder::filter`].
    pub fn where_(&mut self, filter: QueryMap) -> &mut Self {
        self.filter(filter)
    }

    /// Column returned by INSERT (`RETURNING <id>`).
    pub fn return_id(&mut self, id: &str) -> &mut Self {
        self.query.return_id = Some(id.to_string());
        self
    }

    /// Join another table; it gets the next `t<N>` alias.
    pub fn join(&mut self, join: Join) -> &mut Self {
        let alias = self.query.aliases.add_join(&join.source);
        self.query.joins.push(JoinClause { join, alias });
        self
    }

    pub fn order(&mut self, order: OrderParam) -> &mut Self {
        self.query.order.push(order);
        self
    }

    /// LIMIT/OFFSET. A zero limit renders no LIMIT clause.
    pub fn limit(&mut self, limit: i64, offset: i64) -> &mut Self {
        self.query.limit = limit;
        self.query.offset = offset;
        self
    }

    /// `NOTHING` or `UPDATE`, case-insensitive. Anything else clears the action.
    pub fn on_conflict_action(&mut self, action: &str) -> &mut Self {
        self.query.conflict.action = action.parse().ok();
        self
    }

    /// Unique columns the conflict clause targets.
    pub fn on_conflict_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.conflict.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Constraint the conflict clause targets; wins over fields.
    pub fn on_conflict_constraint(&mut self, constraint: &str) -> &mut Self {
        self.query.conflict.constraint = Some(constraint.to_string());
        self
    }

    /// Render the statement.
    pub fn build(&self) -> String {
        self.dialect.query_builder().build(&self.query)
    }

    fn set_table(&mut self, table: &str) {
        self.query.table = table.to_string();
        self.query.aliases.set_base(table);
    }
}

#[cfg(test)]
mod tests;
