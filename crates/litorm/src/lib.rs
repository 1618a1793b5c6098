//! # litorm
//!
//! A dialect-aware literal-SQL builder and a generic model repository for
//! Postgres and MySQL.
//!
//! ## Features
//!
//! - **Fluent builder**: SELECT / INSERT / UPDATE / DELETE / UPSERT with joins,
//!   ordering and paging, rendered per dialect
//! - **Literal SQL**: values are formatted into the statement text by one module
//!   ([`literal`]); nothing is bound
//! - **Model descriptors**: `#[derive(Model)]` records columns, primary key and
//!   generated UUID fields at compile time
//! - **Repository**: `find` / `find_by_id` / `create` / `update` / `delete` /
//!   `exec` with persistent joins and an optional mapper hook
//! - **Connection liveness**: lazy connect with a per-dialect reconnect policy
//!
//! ## Builder
//!
//! ```ignore
//! use litorm::{Builder, Join, values};
//!
//! let mut qb = Builder::postgres();
//! qb.select(["id", "name"])
//!     .from("users")
//!     .join(Join::left("statuses", "id", "status_id").fields(["title"]))
//!     .filter(values! { "id" => vec![1i64, 2, 3] });
//! assert_eq!(
//!     qb.build(),
//!     "SELECT t.id, t.name, t1.title FROM users as t \
//!      LEFT JOIN statuses AS t1 ON t1.id = t.status_id WHERE t.id IN (1,2,3)"
//! );
//! ```
//!
//! ## Repository
//!
//! ```ignore
//! use litorm::{DbConfig, Model, Modificator, PostgresAdapter, Recorder, Repository, values};
//!
//! #[derive(Model, Debug)]
//! struct User {
//!     #[orm(key)]
//!     id: i64,
//!     name: String,
//! }
//!
//! let db = Arc::new(PostgresAdapter::postgres(DbConfig::from_env("DB")?));
//! let users = Repository::<User, _>::new(db, "users").auto_id("id");
//! let user = users.create(values! { "name" => "a" }).await?;
//! let again = users.find_by_id(user.id).await?;
//! ```
//!
//! ## Logging
//!
//! Generated statements are emitted as `tracing` debug events with target
//! `litorm.sql`; connection events use target `litorm.adapter`.

pub mod adapter;
pub mod builder;
pub mod config;
pub mod error;
pub mod literal;
pub mod model;
pub mod repository;
pub mod value;

pub use adapter::{
    Adapter, Connector, ExecResult, Liveness, PostgresAdapter, PostgresConnector, SqlAdapter,
};
#[cfg(feature = "mysql")]
pub use adapter::{MySqlAdapter, MySqlConnector};
pub use builder::{
    Builder, Conflict, ConflictAction, Dialect, Join, JoinOn, JoinType, MySqlQueryBuilder,
    OrderParam, PostgresQueryBuilder, Query, QueryBuilder, QueryType,
};
pub use config::{DbConfig, SslMode};
pub use error::{OrmError, OrmResult};
pub use model::{FieldDescriptor, FieldKind, FromValue, Generator, Model, ModelDescriptor};
pub use repository::{Mapper, Modificator, Recorder, Repository};
pub use value::{Payload, QueryMap, Row, Value};

#[cfg(feature = "derive")]
pub use litorm_derive::Model;
