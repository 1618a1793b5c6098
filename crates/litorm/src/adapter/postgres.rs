//! Postgres connector: `tokio-postgres` behind a `deadpool-postgres` pool.

use std::net::IpAddr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tokio_postgres::types::{FromSql, Kind, Type};
use tokio_postgres::{NoTls, SimpleQueryMessage};
use uuid::Uuid;

use super::{Connector, ExecResult};
use crate::builder::Dialect;
use crate::config::{DbConfig, SslMode};
use crate::error::{OrmError, OrmResult};
use crate::value::{Row, Value};

/// Maximum pool size. Pool tuning beyond this is left to the driver defaults.
const MAX_POOL_SIZE: usize = 16;

/// Connector for Postgres.
///
/// - `exec` uses the simple-query protocol: the affected row count comes from
///   the command tag and the first column of a returned row (`RETURNING id`)
///   becomes [`ExecResult::last_insert_id`].
/// - `query` decodes typed columns. Types sent as text on the wire (enums,
///   `citext`, `xml`) become strings; any other unmapped type is a
///   [`OrmError::Decode`].
///
/// Connections use `NoTls`: `sslmode=require` fails at connect instead of
/// falling back to plaintext.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresConnector;

fn pg_config(config: &DbConfig) -> tokio_postgres::Config {
    let mut pg = tokio_postgres::Config::new();
    pg.host(&config.host)
        .user(&config.user)
        .dbname(&config.database);
    if config.port != 0 {
        pg.port(config.port);
    }
    if !config.password.is_empty() {
        pg.password(&config.password);
    }
    pg.ssl_mode(match config.ssl_mode.unwrap_or(SslMode::Disable) {
        SslMode::Disable => tokio_postgres::config::SslMode::Disable,
        SslMode::Prefer => tokio_postgres::config::SslMode::Prefer,
        SslMode::Require => tokio_postgres::config::SslMode::Require,
    });
    pg
}

/// Build the pool and check out one connection so that a bad config or an
/// unreachable server fails here.
async fn create_pool(config: &DbConfig) -> OrmResult<Pool> {
    let manager = Manager::from_config(
        pg_config(config),
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    let pool = Pool::builder(manager)
        .max_size(MAX_POOL_SIZE)
        .build()
        .map_err(|e| OrmError::Pool(e.to_string()))?;
    pool.get()
        .await
        .map_err(|e| OrmError::Connection(e.to_string()))?;
    Ok(pool)
}

impl Connector for PostgresConnector {
    type Handle = Pool;

    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn connect(&self, config: &DbConfig) -> OrmResult<Pool> {
        create_pool(config).await
    }

    fn open_connections(&self, pool: &Pool) -> usize {
        pool.status().size
    }

    async fn exec(&self, pool: &Pool, sql: &str) -> OrmResult<ExecResult> {
        let client = pool.get().await?;
        let messages = client.simple_query(sql).await?;

        let mut result = ExecResult::default();
        for message in messages {
            match message {
                SimpleQueryMessage::CommandComplete(rows) => result.rows_affected += rows,
                SimpleQueryMessage::Row(row) if result.last_insert_id.is_none() => {
                    result.last_insert_id = row.get(0).map(parse_returned_id);
                }
                _ => {}
            }
        }
        Ok(result)
    }

    async fn query(&self, pool: &Pool, sql: &str) -> OrmResult<Vec<Row>> {
        let client = pool.get().await?;
        let rows = client.query(sql, &[]).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn close(&self, pool: &Pool) {
        pool.close();
    }
}

/// Text of a returned id: integer first, then float, then the text itself.
fn parse_returned_id(text: &str) -> Value {
    if let Ok(id) = text.parse::<i64>() {
        return Value::Int(id);
    }
    match Value::from_driver_bytes(text.as_bytes()) {
        Value::Float(f) => Value::Float(f),
        _ => Value::Str(text.to_string()),
    }
}

/// Types whose binary wire form is their text form.
fn is_text_form(ty: &Type) -> bool {
    matches!(ty.kind(), Kind::Enum(_))
        || *ty == Type::XML
        || *ty == Type::UNKNOWN
        || ty.name() == "citext"
}

/// Text of a column whose binary form is text, see [`is_text_form`].
struct TextForm(String);

impl<'a> FromSql<'a> for TextForm {
    fn from_sql(
        _ty: &Type,
        raw: &'a [u8],
    ) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        Ok(TextForm(std::str::from_utf8(raw)?.to_string()))
    }

    fn accepts(ty: &Type) -> bool {
        is_text_form(ty)
    }
}

fn decode_row(row: &tokio_postgres::Row) -> OrmResult<Row> {
    let mut out = Row::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value = decode_column(row, idx, column.type_())
            .map_err(|e| OrmError::decode(column.name(), e.to_string()))?
            .ok_or_else(|| unsupported(column.name(), column.type_()))?;
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

fn unsupported(column: &str, ty: &Type) -> OrmError {
    OrmError::decode(
        column,
        format!("unsupported column type {}; cast it in the query (e.g. ::text)", ty.name()),
    )
}

fn get<'a, T: FromSql<'a>>(
    row: &'a tokio_postgres::Row,
    idx: usize,
) -> Result<Option<T>, tokio_postgres::Error> {
    row.try_get::<_, Option<T>>(idx)
}

/// `Ok(None)` when the column type has no mapping.
fn decode_column(
    row: &tokio_postgres::Row,
    idx: usize,
    ty: &Type,
) -> Result<Option<Value>, tokio_postgres::Error> {
    let value = match *ty {
        Type::BOOL => get::<bool>(row, idx)?.map(Value::Bool),
        Type::CHAR => get::<i8>(row, idx)?.map(Value::from),
        Type::INT2 => get::<i16>(row, idx)?.map(Value::from),
        Type::INT4 => get::<i32>(row, idx)?.map(Value::from),
        Type::INT8 => get::<i64>(row, idx)?.map(Value::Int),
        Type::OID => get::<u32>(row, idx)?.map(Value::from),
        Type::FLOAT4 => get::<f32>(row, idx)?.map(Value::from),
        Type::FLOAT8 => get::<f64>(row, idx)?.map(Value::Float),
        Type::NUMERIC => get::<Decimal>(row, idx)?.map(|d| match d.to_f64() {
            Some(f) => Value::Float(f),
            None => Value::Str(d.to_string()),
        }),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            get::<String>(row, idx)?.map(Value::Str)
        }
        Type::TIMESTAMPTZ => get::<DateTime<Utc>>(row, idx)?.map(Value::Timestamp),
        Type::TIMESTAMP => get::<NaiveDateTime>(row, idx)?.map(|ts| Value::Timestamp(ts.and_utc())),
        Type::DATE => get::<NaiveDate>(row, idx)?
            .map(|d| Value::Timestamp(d.and_time(NaiveTime::MIN).and_utc())),
        Type::TIME => get::<NaiveTime>(row, idx)?.map(|t| Value::Str(t.to_string())),
        Type::INET => get::<IpAddr>(row, idx)?.map(|ip| Value::Str(ip.to_string())),
        Type::UUID => get::<Uuid>(row, idx)?.map(Value::from),
        Type::JSON | Type::JSONB => {
            get::<serde_json::Value>(row, idx)?.map(|j| Value::Str(j.to_string()))
        }
        Type::BYTEA => get::<Vec<u8>>(row, idx)?.map(Value::Bytes),
        Type::INT2_ARRAY => get::<Vec<i16>>(row, idx)?
            .map(|v| Value::IntList(v.into_iter().map(i64::from).collect())),
        Type::INT4_ARRAY => get::<Vec<i32>>(row, idx)?.map(Value::from),
        Type::INT8_ARRAY => get::<Vec<i64>>(row, idx)?.map(Value::IntList),
        Type::FLOAT4_ARRAY => get::<Vec<f32>>(row, idx)?
            .map(|v| Value::FloatList(v.into_iter().map(f64::from).collect())),
        Type::FLOAT8_ARRAY => get::<Vec<f64>>(row, idx)?.map(Value::FloatList),
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY => get::<Vec<String>>(row, idx)?.map(Value::StrList),
        Type::UUID_ARRAY => get::<Vec<Uuid>>(row, idx)?
            .map(|v| Value::StrList(v.iter().map(Uuid::to_string).collect())),
        _ if is_text_form(ty) => get::<TextForm>(row, idx)?.map(|text| Value::Str(text.0)),
        _ => return Ok(None),
    };
    Ok(Some(value.unwrap_or(Value::Null)))
}
