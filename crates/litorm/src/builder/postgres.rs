use super::query::{ConflictAction, Query};
use super::render;
use super::traits::QueryBuilder;

/// Postgres renderer.
///
/// UPDATE and DELETE alias the base table like SELECT does, RETURNING and
/// ON CONFLICT are supported, and LIMIT only applies to SELECT.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresQueryBuilder;

impl PostgresQueryBuilder {
    fn insert_head(&self, query: &Query) -> String {
        format!(
            "INSERT INTO {} {}",
            query.table,
            render::columns_values(&query.values, render::plain)
        )
    }

    fn returning(&self, query: &Query) -> String {
        match &query.return_id {
            Some(id) => format!(" RETURNING {}", id),
            None => String::new(),
        }
    }

    fn on_conflict(&self, query: &Query) -> String {
        let conflict = &query.conflict;
        if !conflict.is_complete() {
            return String::new();
        }
        let target = match &conflict.constraint {
            Some(name) => format!(" ON CONFLICT ON CONSTRAINT {}", name),
            None => format!(" ON CONFLICT ({})", conflict.fields.join(",")),
        };
        let action = match conflict.action {
            Some(ConflictAction::Update) => format!(
                " DO UPDATE SET {} RETURNING *",
                render::assignments(&query.values, render::plain)
            ),
            _ => " DO NOTHING".to_string(),
        };
        target + &action
    }
}

impl QueryBuilder for PostgresQueryBuilder {
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
        self.insert_head(query) + &self.returning(query)
    }

    fn build_upsert(&self, query: &Query) -> String {
        let conflict = self.on_conflict(query);
        let mut sql = self.insert_head(query);
        // DO UPDATE already returns the whole row.
        let returns_row = conflict.ends_with("RETURNING *");
        sql.push_str(&conflict);
        if !returns_row {
            sql.push_str(&self.returning(query));
        }
        sql
    }

    fn build_update(&self, query: &Query) -> String {
        let mut sql = String::from("UPDATE");
        sql.push_str(&render::table(query, true));
        sql.push_str(&render::setter(query, render::plain));
        sql.push_str(&render::where_clause(query, true));
        sql
    }

    fn build_delete(&self, query: &Query) -> String {
        let mut sql = String::from("DELETE");
        sql.push_str(&render::from(query, true));
        sql.push_str(&render::where_clause(query, true));
        sql
    }
}
