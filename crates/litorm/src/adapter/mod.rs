//! Connection adapters.
//!
//! An [`Adapter`] owns the live handle to one datastore and exposes raw
//! `exec`/`query` primitives plus a [`Builder`] for its dialect. The generic
//! [`SqlAdapter`] implements connection management once; the driver-specific
//! part lives behind the [`Connector`] trait.
//!
//! ## Liveness
//!
//! Every operation first makes sure a handle exists (lazy connect). What counts
//! as "stale" depends on the [`Liveness`] policy:
//!
//! - [`Liveness::ReconnectWhenIdle`]: a handle with zero open connections is
//!   replaced before the call. A failed call is not retried.
//! - [`Liveness::RetryOnInvalid`]: only a missing handle triggers a connect. When
//!   a call fails with an invalid-connection error, the handle is dropped and the
//!   call is retried exactly once on a fresh one.
//!
//! A failed connect is returned to the caller; the next call tries again.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::builder::{Builder, Dialect};
use crate::config::DbConfig;
use crate::error::{OrmError, OrmResult};
use crate::value::{Row, Value};

#[cfg(feature = "mysql")]
pub mod mysql;
pub mod postgres;

#[cfg(feature = "mysql")]
pub use mysql::MySqlConnector;
pub use postgres::PostgresConnector;

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Driver-reported id of an inserted row (`RETURNING` column or MySQL
    /// `LAST_INSERT_ID()`).
    pub last_insert_id: Option<Value>,
}

/// Raw access to one datastore.
pub trait Adapter: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// A fresh builder for this adapter's dialect.
    fn builder(&self) -> Builder {
        Builder::new(self.dialect())
    }

    /// Establish the connection now instead of on first use.
    fn connect(&self) -> impl Future<Output = OrmResult<()>> + Send;

    /// Execute a statement that returns no rows (or whose rows are ignored
    /// except for the inserted id).
    fn exec(&self, sql: &str) -> impl Future<Output = OrmResult<ExecResult>> + Send;

    /// Execute a query and decode every row.
    fn query(&self, sql: &str) -> impl Future<Output = OrmResult<Vec<Row>>> + Send;

    /// First row of a query, if any.
    fn query_row(&self, sql: &str) -> impl Future<Output = OrmResult<Option<Row>>> + Send {
        async move { Ok(self.query(sql).await?.into_iter().next()) }
    }
}

/// When a held connection is considered stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// Reconnect when the handle reports zero open connections; never retry.
    ReconnectWhenIdle,
    /// Reconnect only when no handle is held; retry once on an invalid
    /// connection.
    RetryOnInvalid,
}

impl Liveness {
    /// Policy used for `dialect` unless overridden.
    pub fn default_for(dialect: Dialect) -> Self {
        match dialect {
            Dialect::MySql => Liveness::ReconnectWhenIdle,
            Dialect::Postgres => Liveness::RetryOnInvalid,
        }
    }
}

/// Driver seam used by [`SqlAdapter`].
pub trait Connector: Send + Sync + 'static {
    /// Live connection (usually a pool).
    type Handle: Send + Sync + 'static;

    fn dialect(&self) -> Dialect;

    fn connect(&self, config: &DbConfig) -> impl Future<Output = OrmResult<Self::Handle>> + Send;

    /// Number of connections currently open in `handle`.
    fn open_connections(&self, handle: &Self::Handle) -> usize;

    fn exec(
        &self,
        handle: &Self::Handle,
        sql: &str,
    ) -> impl Future<Output = OrmResult<ExecResult>> + Send;

    fn query(
        &self,
        handle: &Self::Handle,
        sql: &str,
    ) -> impl Future<Output = OrmResult<Vec<Row>>> + Send;

    /// Release `handle`. Called before it is replaced.
    fn close(&self, handle: &Self::Handle) -> impl Future<Output = ()> + Send;

    /// Whether `err` means the connection is gone.
    fn is_invalid_connection(&self, err: &OrmError) -> bool {
        err.is_invalid_connection()
    }
}

/// [`Adapter`] over a [`Connector`], with lazy connect and a liveness policy.
pub struct SqlAdapter<C: Connector> {
    connector: C,
    config: DbConfig,
    liveness: Liveness,
    handle: RwLock<Option<Arc<C::Handle>>>,
}

/// Postgres adapter (`tokio-postgres` + `deadpool-postgres`).
pub type PostgresAdapter = SqlAdapter<PostgresConnector>;

/// MySQL adapter (`sqlx`).
#[cfg(feature = "mysql")]
pub type MySqlAdapter = SqlAdapter<MySqlConnector>;

impl PostgresAdapter {
    pub fn postgres(config: DbConfig) -> Self {
        Self::new(PostgresConnector, config)
    }
}

#[cfg(feature = "mysql")]
impl MySqlAdapter {
    pub fn mysql(config: DbConfig) -> Self {
        Self::new(MySqlConnector, config)
    }
}

impl<C: Connector> SqlAdapter<C> {
    /// Create a disconnected adapter using the dialect's default policy.
    pub fn new(connector: C, config: DbConfig) -> Self {
        let liveness = Liveness::default_for(connector.dialect());
        Self {
            connector,
            config,
            liveness,
            handle: RwLock::new(None),
        }
    }

    /// Override the liveness policy.
    pub fn with_liveness(mut self, liveness: Liveness) -> Self {
        self.liveness = liveness;
        self
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub async fn is_connected(&self) -> bool {
        self.handle.read().await.is_some()
    }

    /// Drop the current handle; the next call reconnects.
    pub async fn close(&self) {
        if let Some(handle) = self.handle.write().await.take() {
            self.connector.close(&handle).await;
        }
    }

    fn is_live(&self, handle: &C::Handle) -> bool {
        match self.liveness {
            Liveness::RetryOnInvalid => true,
            Liveness::ReconnectWhenIdle => self.connector.open_connections(handle) > 0,
        }
    }

    /// Current handle, connecting (or reconnecting) as the policy requires.
    async fn handle(&self) -> OrmResult<Arc<C::Handle>> {
        if let Some(handle) = self.handle.read().await.as_ref() {
            if self.is_live(handle) {
                return Ok(Arc::clone(handle));
            }
        }

        let mut guard = self.handle.write().await;
        if let Some(handle) = guard.as_ref() {
            if self.is_live(handle) {
                return Ok(Arc::clone(handle));
            }
            tracing::info!(
                target: "litorm.adapter",
                dialect = %self.connector.dialect(),
                "no open connections, reconnecting"
            );
            self.connector.close(handle).await;
            *guard = None;
        }

        let handle = Arc::new(self.connector.connect(&self.config).await?);
        tracing::info!(
            target: "litorm.adapter",
            dialect = %self.connector.dialect(),
            host = %self.config.host,
            database = %self.config.database,
            "connected"
        );
        *guard = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Forget `stale` unless another call already replaced it.
    async fn invalidate(&self, stale: &Arc<C::Handle>) {
        let mut guard = self.handle.write().await;
        if guard.as_ref().is_some_and(|h| Arc::ptr_eq(h, stale)) {
            self.connector.close(stale).await;
            *guard = None;
        }
    }

    /// Run `op` on the current handle, retrying once when the policy allows.
    async fn run<T, F, Fut>(&self, op: F) -> OrmResult<T>
    where
        F: Fn(Arc<C::Handle>) -> Fut + Send + Sync,
        Fut: Future<Output = OrmResult<T>> + Send,
        T: Send,
    {
        let handle = self.handle().await?;
        match op(Arc::clone(&handle)).await {
            Err(err)
                if self.liveness == Liveness::RetryOnInvalid
                    && self.connector.is_invalid_connection(&err) =>
            {
                tracing::warn!(
                    target: "litorm.adapter",
                    dialect = %self.connector.dialect(),
                    error = %err,
                    "invalid connection, retrying once"
                );
                self.invalidate(&handle).await;
                let handle = self.handle().await?;
                op(handle).await
            }
            result => result,
        }
    }
}

impl<C: Connector> Adapter for SqlAdapter<C> {
    fn dialect(&self) -> Dialect {
        self.connector.dialect()
    }

    async fn connect(&self) -> OrmResult<()> {
        self.handle().await.map(|_| ())
    }

    async fn exec(&self, sql: &str) -> OrmResult<ExecResult> {
        self.run(|handle| async move { self.connector.exec(&handle, sql).await })
            .await
    }

    async fn query(&self, sql: &str) -> OrmResult<Vec<Row>> {
        self.run(|handle| async move { self.connector.query(&handle, sql).await })
            .await
    }
}

impl<C: Connector + std::fmt::Debug> std::fmt::Debug for SqlAdapter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlAdapter")
            .field("connector", &self.connector)
            .field("config", &self.config)
            .field("liveness", &self.liveness)
            .finish_non_exhaustive()
    }
}
