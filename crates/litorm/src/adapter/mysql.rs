//! MySQL connector on a `sqlx` pool.
//!
//! Statements run through `sqlx::raw_sql` (text protocol), matching the
//! literal-SQL contract of the builder.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow, MySqlSslMode};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

use super::{Connector, ExecResult};
use crate::builder::Dialect;
use crate::config::{DbConfig, SslMode};
use crate::error::{OrmError, OrmResult};
use crate::value::{Row, Value};

const MAX_POOL_SIZE: u32 = 16;

/// Connector for MySQL.
///
/// `exec` reports the affected row count and, when non-zero, the
/// `LAST_INSERT_ID()` of the statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnector;

fn connect_options(config: &DbConfig) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .host(&config.host)
        .username(&config.user)
        .database(&config.database);
    if config.port != 0 {
        options = options.port(config.port);
    }
    if !config.password.is_empty() {
        options = options.password(&config.password);
    }
    // Unset keeps the driver default.
    if let Some(mode) = config.ssl_mode {
        options = options.ssl_mode(match mode {
            SslMode::Disable => MySqlSslMode::Disabled,
            SslMode::Prefer => MySqlSslMode::Preferred,
            SslMode::Require => MySqlSslMode::Required,
        });
    }
    options
}

impl Connector for MySqlConnector {
    type Handle = MySqlPool;

    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    async fn connect(&self, config: &DbConfig) -> OrmResult<MySqlPool> {
        MySqlPoolOptions::new()
            .max_connections(MAX_POOL_SIZE)
            .connect_with(connect_options(config))
            .await
            .map_err(|e| OrmError::Connection(e.to_string()))
    }

    fn open_connections(&self, pool: &MySqlPool) -> usize {
        pool.size() as usize
    }

    async fn exec(&self, pool: &MySqlPool, sql: &str) -> OrmResult<ExecResult> {
        let done = sqlx::raw_sql(sql).execute(pool).await?;
        let id = done.last_insert_id();
        Ok(ExecResult {
            rows_affected: done.rows_affected(),
            last_insert_id: (id != 0).then(|| unsigned(id)),
        })
    }

    async fn query(&self, pool: &MySqlPool, sql: &str) -> OrmResult<Vec<Row>> {
        let rows = sqlx::raw_sql(sql).fetch_all(pool).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn close(&self, pool: &MySqlPool) {
        pool.close().await;
    }
}

/// Unsigned values past `i64::MAX` are kept as decimal text.
fn unsigned(value: u64) -> Value {
    match i64::try_from(value) {
        Ok(v) => Value::Int(v),
        Err(_) => Value::Str(value.to_string()),
    }
}

fn decode_row(row: &MySqlRow) -> OrmResult<Row> {
    let mut out = Row::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value = decode_column(row, idx, column.type_info().name())
            .map_err(|e| OrmError::decode(column.name(), e.to_string()))?;
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

fn decode_column(row: &MySqlRow, idx: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    if row.try_get_raw(idx)?.is_null() {
        return Ok(Value::Null);
    }
    let value = match type_name {
        "BOOLEAN" => Value::Bool(row.try_get::<bool, _>(idx)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            Value::Int(row.try_get::<i64, _>(idx)?)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => unsigned(row.try_get::<u64, _>(idx)?),
        "FLOAT" => Value::from(row.try_get::<f32, _>(idx)?),
        "DOUBLE" => Value::Float(row.try_get::<f64, _>(idx)?),
        "CHAR" | "VARCHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET"
        | "JSON" => Value::Str(row.try_get::<String, _>(idx)?),
        "TIMESTAMP" => Value::Timestamp(row.try_get::<DateTime<Utc>, _>(idx)?),
        "DATETIME" => Value::Timestamp(row.try_get::<NaiveDateTime, _>(idx)?.and_utc()),
        "DATE" => Value::Timestamp(
            row.try_get::<NaiveDate, _>(idx)?
                .and_time(NaiveTime::MIN)
                .and_utc(),
        ),
        // DECIMAL, BLOB, BINARY and anything unknown arrive as bytes.
        _ => Value::from_driver_bytes(&row.try_get_unchecked::<Vec<u8>, _>(idx)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_values_do_not_wrap() {
        assert_eq!(unsigned(42), Value::Int(42));
        assert_eq!(unsigned(i64::MAX as u64), Value::Int(i64::MAX));
        assert_eq!(unsigned(u64::MAX), Value::from("18446744073709551615"));
    }

    #[test]
    fn options_skip_empty_password_and_port() {
        let options = connect_options(&DbConfig::new("db", 0, "root", "shop"));
        assert_eq!(options.get_host(), "db");
        assert_eq!(options.get_port(), 3306);
        assert_eq!(options.get_username(), "root");
        assert_eq!(options.get_database(), Some("shop"));
    }
}
