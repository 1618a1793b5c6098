use super::query::Query;
use super::render;
use super::traits::QueryBuilder;

/// MySQL renderer.
///
/// UPDATE and DELETE address the base table without an alias, column names in
/// INSERT/SET are back-quoted, and a non-zero limit is honoured on UPDATE and
/// DELETE. MySQL has no RETURNING (the driver reports the insert id) and no
/// ON CONFLICT, so an upsert renders as a plain INSERT.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlQueryBuilder;

impl MySqlQueryBuilder {
    fn mutation_limit(&self, query: &Query) -> String {
        if query.limit == 0 {
            return String::new();
        }
        format!(" LIMIT {}", query.limit)
    }
}

impl QueryBuilder for MySqlQueryBuilder {
    fn build_select(&self, query: &Query) -> String {
        let mut sql = String::from("SELECT");
        sql.push_str(&render::fields(query));
        sql.push_str(&render::from(query, true));
        sql.push_str(&render::joins(query));
        sql.push_str(&render::where_clause(query, true));
        sql.push_str(&render::order_by(query));
        sql.push_str(&render::limit_offset(query));
        sql
    }

    fn build_insert(&self, query: &Query) -> String {
        format!(
            "INSERT INTO {} {}",
            query.table,
            render::columns_values(&query.values, render::backtick)
        )
    }

    fn build_upsert(&self, query: &Query) -> String {
        self.build_insert(query)
    }

    fn build_update(&self, query: &Query) -> String {
        let mut sql = String::from("UPDATE");
        sql.push_str(&render::table(query, false));
        sql.push_str(&render::setter(query, render::backtick));
        sql.push_str(&render::where_clause(query, false));
        sql.push_str(&self.mutation_limit(query));
        sql
    }

    fn build_delete(&self, query: &Query) -> String {
        let mut sql = String::from("DELETE");
        sql.push_str(&render::from(query, false));
        sql.push_str(&render::where_clause(query, false));
        sql.push_str(&self.mutation_limit(query));
        sql
    }
}
