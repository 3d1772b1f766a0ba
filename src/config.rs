use std::collections::HashMap;

use serde::Deserialize;

const MAX_DB_CONNECTIONS: u64 = 1_000;
const MAX_DB_QUEUE_LIMIT: u64 = 100_000;
/// One year.
const MAX_JWT_TTL_MINUTES: u64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: u64,
}

/// Connection settings for the MySQL credential store.
#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub name: Option<String>,
    pub max_connections: u32,
    /// Queries allowed to wait for a connection once the pool is exhausted.
    pub queue_limit: u32,
    pub acquire_timeout_secs: u64,
}

impl DbConfig {
    /// Queries admitted at once: running on a connection or waiting for one.
    pub fn max_in_flight(&self) -> usize {
        (self.max_connections as usize).saturating_add(self.queue_limit as usize)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub db: DbConfig,
    /// Signed tokens are issued only when a secret is configured.
    pub jwt: Option<JwtConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_map(vars: &HashMap<String, String>) -> anyhow::Result<Self> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let parsed = |key: &str, default: u64| -> anyhow::Result<u64> {
            match get(key) {
                Some(v) => v
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| anyhow::anyhow!("{key}: {e}")),
                None => Ok(default),
            }
        };
        let bounded = |key: &str, default: u64, min: u64, max: u64| -> anyhow::Result<u64> {
            let v = parsed(key, default)?;
            if !(min..=max).contains(&v) {
                anyhow::bail!("{key}: {v} is outside {min}..={max}");
            }
            Ok(v)
        };

        let db = DbConfig {
            host: get("DB_HOST").unwrap_or_else(|| "localhost".into()),
            port: u16::try_from(parsed("DB_PORT", 3306)?)?,
            user: get("DB_USER").unwrap_or_else(|| "root".into()),
            password: get("DB_PASSWORD"),
            name: get("DB_NAME").filter(|v| !v.is_empty()),
            max_connections: u32::try_from(bounded("DB_MAX_CONNECTIONS", 10, 1, MAX_DB_CONNECTIONS)?)?,
            queue_limit: u32::try_from(bounded("DB_QUEUE_LIMIT", 100, 0, MAX_DB_QUEUE_LIMIT)?)?,
            acquire_timeout_secs: parsed("DB_ACQUIRE_TIMEOUT_SECS", 5)?,
        };

        let jwt = match get("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => Some(JwtConfig {
                secret,
                issuer: get("JWT_ISSUER").unwrap_or_else(|| "resortstats".into()),
                audience: get("JWT_AUDIENCE").unwrap_or_else(|| "statistics".into()),
                ttl_minutes: bounded("JWT_TTL_MINUTES", 60, 1, MAX_JWT_TTL_MINUTES)?,
            }),
            None => None,
        };

        Ok(Self {
            port: u16::try_from(parsed("PORT", 5000)?)?,
            db,
            jwt,
        })
    }
}
