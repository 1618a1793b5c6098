//! Connection parameters.
//!
//! A flat record of host, port, credentials and database name. It can be
//! deserialized, built in code, or read from `<PREFIX>_*` environment
//! variables (after loading `.env` through `dotenvy`).

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{OrmError, OrmResult};

/// TLS requirement for the connection. Unset means `disable` on Postgres and
/// the driver default on MySQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    Disable,
    Prefer,
    Require,
}

impl SslMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
        }
    }
}

impl fmt::Display for SslMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SslMode {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disable" => Ok(SslMode::Disable),
            "prefer" => Ok(SslMode::Prefer),
            "require" => Ok(SslMode::Require),
            other => Err(OrmError::validation(format!("unknown sslmode: {other}"))),
        }
    }
}

/// Connection parameters for one datastore.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub database: String,
    #[serde(default)]
    pub ssl_mode: Option<SslMode>,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

impl DbConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: String::new(),
            database: database.into(),
            ssl_mode: None,
        }
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn ssl_mode(mut self, mode: SslMode) -> Self {
        self.ssl_mode = Some(mode);
        self
    }

    /// Read `<PREFIX>_HOST`, `_PORT`, `_USER`, `_PASSWORD`, `_NAME` and
    /// `_SSLMODE`. `HOST`, `USER` and `NAME` are required.
    pub fn from_env(prefix: &str) -> OrmResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(prefix, |key| env::var(key).ok())
    }

    fn from_lookup(prefix: &str, lookup: impl Fn(&str) -> Option<String>) -> OrmResult<Self> {
        let var = |suffix: &str| lookup(&format!("{prefix}_{suffix}"));
        let required = |suffix: &str| {
            var(suffix).ok_or_else(|| OrmError::validation(format!("{prefix}_{suffix} is not set")))
        };

        let port: u16 = match var("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| OrmError::validation(format!("{prefix}_PORT is not a port: {port}")))?,
            None => 0,
        };
        let ssl_mode = var("SSLMODE").map(|s| s.parse::<SslMode>()).transpose()?;

        Ok(Self {
            host: required("HOST")?,
            port,
            user: required("USER")?,
            password: var("PASSWORD").unwrap_or_default(),
            database: required("NAME")?,
            ssl_mode,
        })
    }
}
