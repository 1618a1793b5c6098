//! Generic CRUD over one table.
//!
//! A [`Repository`] binds an [`Adapter`], a source table and a [`Model`]. Each
//! call builds literal SQL with a fresh [`Builder`](crate::Builder), runs it,
//! and maps the decoded rows back into models (or through a [`Mapper`]).
//!
//! Joins registered with [`Recorder::join`] are persistent: they apply to every
//! later `find`, `find_by_id` and `update` read-back on the same repository.
//!
//! ```ignore
//! use litorm::{JoinType, Modificator, PostgresAdapter, Recorder, Repository, values};
//!
//! let db = Arc::new(PostgresAdapter::postgres(DbConfig::from_env("DB")?));
//! let mut users = Repository::<User, _>::new(db, "users");
//! users.join("statuses", "id", "status_id", JoinType::Left, &["title"]);
//!
//! let created = users.create(values! { "name" => "a" }).await?;
//! let page = users.find(&values! { "age>" => 18 }, &Modificator::new().limit(20)).await?;
//! ```

mod modificator;

pub use modificator::{DEFAULT_LIMIT, Modificator};

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::adapter::{Adapter, ExecResult};
use crate::builder::{Join, JoinOn, JoinType};
use crate::error::{OrmError, OrmResult};
use crate::model::{Model, ModelDescriptor};
use crate::value::{Payload, QueryMap, Row, Value};

/// Domain-specific shaping of fetched rows.
///
/// When installed, it replaces the default [`Model::from_row`] population for
/// every item and collection a repository returns.
pub trait Mapper<M>: Send + Sync {
    fn item(&self, row: &Row) -> OrmResult<M>;

    fn collection(&self, rows: Vec<Row>) -> OrmResult<Vec<M>> {
        rows.iter().map(|row| self.item(row)).collect()
    }
}

/// The repository contract exposed to callers.
pub trait Recorder<M: Model>: Send + Sync {
    /// Rows matching `query`, shaped by `modificator`. Never fails on zero
    /// rows; the result is just empty.
    fn find(
        &self,
        query: &QueryMap,
        modificator: &Modificator,
    ) -> impl Future<Output = OrmResult<Vec<M>>> + Send;

    /// The row whose primary key (or `id`) equals `id`.
    ///
    /// Returns [`OrmError::NotFound`] when nothing matches.
    fn find_by_id(&self, id: impl Into<Value> + Send) -> impl Future<Output = OrmResult<M>> + Send;

    /// Insert `payload` and return the created model.
    fn create(&self, payload: Payload) -> impl Future<Output = OrmResult<M>> + Send;

    /// Update rows matching `query` with `payload` and read them back.
    fn update(
        &self,
        query: &QueryMap,
        payload: &Payload,
    ) -> impl Future<Output = OrmResult<Vec<M>>> + Send;

    fn delete(&self, query: &QueryMap) -> impl Future<Output = OrmResult<ExecResult>> + Send;

    fn delete_by_id(
        &self,
        id: impl Into<Value> + Send,
    ) -> impl Future<Output = OrmResult<ExecResult>> + Send;

    /// Register a join applied to every later read. Re-registering `source`
    /// replaces the previous join.
    fn join(
        &mut self,
        source: &str,
        key: &str,
        target_key: &str,
        join_type: JoinType,
        fields: &[&str],
    );

    fn set_mapper(&mut self, mapper: impl Mapper<M> + 'static);

    /// Run caller-supplied SQL and map the returned rows.
    fn exec(&self, sql: &str) -> impl Future<Output = OrmResult<Vec<M>>> + Send;
}

/// [`Recorder`] implementation for model `M` over adapter `A`.
pub struct Repository<M: Model, A: Adapter> {
    adapter: Arc<A>,
    source: String,
    descriptor: &'static ModelDescriptor,
    joins: BTreeMap<String, Join>,
    mapper: Option<Arc<dyn Mapper<M>>>,
    auto_id: Option<String>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model, A: Adapter> Repository<M, A> {
    pub fn new(adapter: Arc<A>, source: impl Into<String>) -> Self {
        Self {
            adapter,
            source: source.into(),
            descriptor: M::descriptor(),
            joins: BTreeMap::new(),
            mapper: None,
            auto_id: None,
            _model: PhantomData,
        }
    }

    pub fn adapter(&self) -> &Arc<A> {
        &self.adapter
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn descriptor(&self) -> &'static ModelDescriptor {
        self.descriptor
    }

    /// Registered joins keyed by source.
    pub fn joins(&self) -> &BTreeMap<String, Join> {
        &self.joins
    }

    /// Ask INSERTs to return `column` and use it as the created row's id.
    ///
    /// Only dialects with `RETURNING` render it; MySQL reports its own
    /// insert id either way.
    pub fn auto_id(mut self, column: impl Into<String>) -> Self {
        self.auto_id = Some(column.into());
        self
    }

    /// Register a fully specified join, including multi-condition `on` entries.
    pub fn join_with(&mut self, join: Join) {
        self.joins.insert(join.source.clone(), join);
    }

    /// Join another model's table, projecting its columns. Conditions are added
    /// with [`Repository::set_join_condition`] and
    /// [`Repository::set_join_condition_value`].
    ///
    /// Rows are keyed by bare column name, so joined columns that share a name
    /// with a column of `M` (`id`, `name`, ...) are not projected; they would
    /// overwrite the base model's value. Use [`Repository::join_with`] with
    /// explicit fields to select them anyway.
    pub fn join_model<J: Model>(&mut self, source: &str, join_type: JoinType) {
        let own = self.descriptor.column_names();
        let fields = J::descriptor()
            .column_names()
            .into_iter()
            .filter(|column| !own.contains(column));
        let join = Join::new(source, "", "", join_type).fields(fields);
        self.join_with(join);
    }

    /// Add `<base>.<source_key> = <joined>.<join_key>` to the join on `source`.
    pub fn set_join_condition(&mut self, source: &str, join_key: &str, source_key: &str) {
        self.join_entry(source)
            .on
            .push(JoinOn::keys(source_key, join_key));
    }

    /// Add `<joined>.<key>` compared against a literal to the join on `source`.
    pub fn set_join_condition_value(&mut self, source: &str, key: &str, value: impl Into<Value>) {
        self.join_entry(source)
            .on
            .push(JoinOn::value(source, key, value));
    }

    fn join_entry(&mut self, source: &str) -> &mut Join {
        self.joins
            .entry(source.to_string())
            .or_insert_with(|| Join::left(source, "", ""))
    }

    fn key_query(&self, id: Value) -> QueryMap {
        let mut query = QueryMap::new();
        query.insert(self.descriptor.key_or_id().to_string(), id);
        query
    }

    fn map_item(&self, row: &Row) -> OrmResult<M> {
        match &self.mapper {
            Some(mapper) => mapper.item(row),
            None => Ok(M::from_row(row)),
        }
    }

    fn map_collection(&self, rows: Vec<Row>) -> OrmResult<Vec<M>> {
        match &self.mapper {
            Some(mapper) => mapper.collection(rows),
            None => Ok(rows.iter().map(M::from_row).collect()),
        }
    }

    /// Build and run the SELECT behind `find` and `find_by_id`.
    async fn fetch(&self, query: &QueryMap, modificator: &Modificator) -> OrmResult<Vec<Row>> {
        let fields = if modificator.fields.is_empty() {
            self.descriptor.column_names()
        } else {
            modificator.fields.clone()
        };

        let mut qb = self.adapter.builder();
        qb.select(fields)
            .from(&self.source)
            .filter(query.clone())
            .limit(modificator.effective_limit(), modificator.skip);
        for join in self.joins.values() {
            qb.join(join.clone());
        }
        for order in &modificator.order_by {
            qb.order(order.clone());
        }

        let sql = qb.build();
        tracing::debug!(target: "litorm.sql", operation = "find", source = %self.source, sql = %sql);
        self.adapter.query(&sql).await
    }
}

impl<M: Model, A: Adapter> Recorder<M> for Repository<M, A> {
    async fn find(&self, query: &QueryMap, modificator: &Modificator) -> OrmResult<Vec<M>> {
        let rows = self.fetch(query, modificator).await?;
        self.map_collection(rows)
    }

    async fn find_by_id(&self, id: impl Into<Value> + Send) -> OrmResult<M> {
        let query = self.key_query(id.into());
        let rows = self.fetch(&query, &Modificator::new().limit(1)).await?;
        match rows.first() {
            Some(row) => self.map_item(row),
            None => Err(OrmError::not_found("Item not found")),
        }
    }

    async fn create(&self, mut payload: Payload) -> OrmResult<M> {
        if payload.is_empty() {
            return Err(OrmError::validation("create payload is empty"));
        }
        self.descriptor.fill_generated(&mut payload);

        let mut qb = self.adapter.builder();
        qb.insert(&self.source).values(payload.clone());
        if let Some(column) = &self.auto_id {
            qb.return_id(column);
        }
        let sql = qb.build();
        tracing::debug!(target: "litorm.sql", operation = "create", source = %self.source, sql = %sql);

        let result = self.adapter.exec(&sql).await?;
        if let Some(id) = result.last_insert_id {
            return self.find_by_id(id).await;
        }
        if let Some(id) = self
            .descriptor
            .primary_key()
            .and_then(|key| payload.get(key))
            .filter(|id| !id.is_null())
        {
            return self.find_by_id(id.clone()).await;
        }
        self.map_item(&payload)
    }

    async fn update(&self, query: &QueryMap, payload: &Payload) -> OrmResult<Vec<M>> {
        let mut qb = self.adapter.builder();
        qb.update(&self.source)
            .set(payload.clone())
            .filter(query.clone())
            .limit(1, 0);
        let sql = qb.build();
        tracing::debug!(target: "litorm.sql", operation = "update", source = %self.source, sql = %sql);
        self.adapter.exec(&sql).await?;

        // Filtered columns that were just changed are read back at their new value.
        let mut reread = query.clone();
        for (column, value) in payload {
            if let Some(filter) = reread.get_mut(column) {
                *filter = value.clone();
            }
        }
        self.find(&reread, &Modificator::new()).await
    }

    async fn delete(&self, query: &QueryMap) -> OrmResult<ExecResult> {
        let mut qb = self.adapter.builder();
        qb.delete().from(&self.source).filter(query.clone());
        let sql = qb.build();
        tracing::debug!(target: "litorm.sql", operation = "delete", source = %self.source, sql = %sql);
        self.adapter.exec(&sql).await
    }

    async fn delete_by_id(&self, id: impl Into<Value> + Send) -> OrmResult<ExecResult> {
        let query = self.key_query(id.into());
        self.delete(&query).await
    }

    fn join(
        &mut self,
        source: &str,
        key: &str,
        target_key: &str,
        join_type: JoinType,
        fields: &[&str],
    ) {
        let join = Join::new(source, key, target_key, join_type).fields(fields.iter().copied());
        self.join_with(join);
    }

    fn set_mapper(&mut self, mapper: impl Mapper<M> + 'static) {
        self.mapper = Some(Arc::new(mapper));
    }

    async fn exec(&self, sql: &str) -> OrmResult<Vec<M>> {
        tracing::debug!(target: "litorm.sql", operation = "exec", source = %self.source, sql = %sql);
        let rows = self.adapter.query(sql).await?;
        self.map_collection(rows)
    }
}

impl<M: Model, A: Adapter> fmt::Debug for Repository<M, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("source", &self.source)
            .field("model", &self.descriptor.name)
            .field("joins", &self.joins)
            .field("mapper", &self.mapper.is_some())
            .field("auto_id", &self.auto_id)
            .finish()
    }
}
