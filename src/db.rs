use std::{sync::Arc, time::Duration};

use serde_json::{Map, Number, Value};
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlRow},
    Column, MySqlPool, Row, TypeInfo, ValueRef,
};
use time::format_description::well_known::Rfc3339;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::DbConfig;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("credential store is not connected")]
    NotConnected,
    #[error("credential store is saturated")]
    Saturated,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("column `{column}` could not be decoded: {reason}")]
    Decode { column: String, reason: String },
}

/// Positional query parameter, bound with `?` placeholders.
#[derive(Debug, Clone)]
pub enum Param {
    Text(String),
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_owned())
    }
}

/// Handle on the MySQL pool. Clones share the pool and the admission budget.
#[derive(Clone)]
pub struct Db {
    pool: Option<MySqlPool>,
    admission: Arc<Semaphore>,
}

impl Db {
    /// Builds the pool without opening a connection; connectivity faults show up per query.
    pub fn connect_lazy(cfg: &DbConfig) -> Self {
        let mut options = MySqlConnectOptions::new()
            .host(&cfg.host)
            .port(cfg.port)
            .username(&cfg.user);
        if let Some(password) = &cfg.password {
            options = options.password(password);
        }
        if let Some(name) = &cfg.name {
            options = options.database(name);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
            .connect_lazy_with(options);

        let in_flight = cfg.max_in_flight();
        debug!(host = %cfg.host, port = cfg.port, max_connections = cfg.max_connections, in_flight, "mysql pool configured");
        Self::new(pool, in_flight)
    }

    pub fn new(pool: MySqlPool, max_in_flight: usize) -> Self {
        Self {
            pool: Some(pool),
            admission: Arc::new(Semaphore::new(max_in_flight)),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            pool: None,
            admission: Arc::new(Semaphore::new(0)),
        }
    }

    pub async fn query(&self, sql: &str, params: &[Param]) -> Result<Vec<MySqlRow>, StoreError> {
        let pool = match &self.pool {
            Some(pool) if !pool.is_closed() => pool,
            _ => return Err(StoreError::NotConnected),
        };

        let _permit = self.admission.try_acquire().map_err(|_| {
            warn!("query rejected: pool and wait queue are full");
            StoreError::Saturated
        })?;

        let mut query = sqlx::query(sql);
        for param in params {
            query = match param {
                Param::Text(v) => query.bind(v.as_str()),
            };
        }
        let rows = query.fetch_all(pool).await?;
        Ok(rows)
    }

    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

/// Converts every column of `row` except `skip` into JSON, keyed by column name.
pub fn row_to_json(row: &MySqlRow, skip: &[&str]) -> Result<Map<String, Value>, StoreError> {
    let mut out = Map::new();
    for column in row.columns() {
        let name = column.name();
        if skip.contains(&name) {
            continue;
        }
        out.insert(name.to_owned(), column_to_json(row, column.ordinal())?);
    }
    Ok(out)
}

/// JSON shape a MySQL column type is rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Bool,
    Signed,
    Unsigned,
    Year,
    Float,
    Double,
    Decimal,
    DateTime,
    Timestamp,
    Date,
    Time,
    Json,
    Binary,
    Text,
}

fn column_kind(type_name: &str) -> ColumnKind {
    match type_name {
        "BOOLEAN" => ColumnKind::Bool,
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => ColumnKind::Signed,
        t if t.ends_with("UNSIGNED") => ColumnKind::Unsigned,
        "YEAR" => ColumnKind::Year,
        "FLOAT" => ColumnKind::Float,
        "DOUBLE" => ColumnKind::Double,
        "DECIMAL" => ColumnKind::Decimal,
        "DATETIME" => ColumnKind::DateTime,
        "TIMESTAMP" => ColumnKind::Timestamp,
        "DATE" => ColumnKind::Date,
        "TIME" => ColumnKind::Time,
        "JSON" => ColumnKind::Json,
        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" | "BIT"
        | "GEOMETRY" => ColumnKind::Binary,
        _ => ColumnKind::Text,
    }
}

/// Extra columns never fail a lookup: a value the typed decoder rejects
/// (zero dates, out-of-range TIME, odd types) is passed on as its raw bytes.
fn column_to_json(row: &MySqlRow, idx: usize) -> Result<Value, StoreError> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_owned();

    match decode_typed(row, idx, column_kind(&type_name)) {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!(column = row.column(idx).name(), type_name = %type_name, error = %e, "column passed through as raw bytes");
            Ok(row
                .try_get_unchecked::<Vec<u8>, _>(idx)
                .map(bytes_to_json)
                .unwrap_or(Value::Null))
        }
    }
}

fn decode_typed(row: &MySqlRow, idx: usize, kind: ColumnKind) -> Result<Value, StoreError> {
    let value = match kind {
        ColumnKind::Bool => Value::Bool(row.try_get::<bool, _>(idx)?),
        ColumnKind::Signed => Value::from(row.try_get::<i64, _>(idx)?),
        ColumnKind::Unsigned => Value::from(row.try_get::<u64, _>(idx)?),
        ColumnKind::Year => Value::from(row.try_get_unchecked::<u16, _>(idx)?),
        ColumnKind::Float => float(row.try_get::<f32, _>(idx)? as f64),
        ColumnKind::Double => float(row.try_get::<f64, _>(idx)?),
        // keep exact digits; JS clients receive decimals as strings too
        ColumnKind::Decimal => Value::String(row.try_get_unchecked::<String, _>(idx)?),
        ColumnKind::DateTime => {
            Value::String(row.try_get::<time::PrimitiveDateTime, _>(idx)?.to_string())
        }
        ColumnKind::Timestamp => {
            let ts = row.try_get::<time::OffsetDateTime, _>(idx)?;
            Value::String(ts.format(&Rfc3339).map_err(|e| decode_err(row, idx, e))?)
        }
        ColumnKind::Date => Value::String(row.try_get::<time::Date, _>(idx)?.to_string()),
        ColumnKind::Time => Value::String(row.try_get::<time::Time, _>(idx)?.to_string()),
        ColumnKind::Json => row.try_get::<Value, _>(idx)?,
        ColumnKind::Binary => bytes_to_json(row.try_get_unchecked::<Vec<u8>, _>(idx)?),
        ColumnKind::Text => Value::String(
            row.try_get_unchecked::<String, _>(idx)
                .map_err(|e| decode_err(row, idx, e))?,
        ),
    };
    Ok(value)
}

fn float(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

/// Binary columns are surfaced as text when they hold UTF-8, else as raw byte values.
pub(crate) fn bytes_to_json(bytes: Vec<u8>) -> Value {
    match String::from_utf8(bytes) {
        Ok(s) => Value::String(s),
        Err(e) => Value::Array(e.into_bytes().into_iter().map(Value::from).collect()),
    }
}

fn decode_err(row: &MySqlRow, idx: usize, e: impl std::fmt::Display) -> StoreError {
    StoreError::Decode {
        column: row.column(idx).name().to_owned(),
        reason: e.to_string(),
    }
}
