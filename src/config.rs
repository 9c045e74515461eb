use std::env;
use std::fmt;

use anyhow::{Context, Result, bail};
use chrono::Duration;
use deadpool_postgres::{Config, Pool, PoolConfig, Runtime};
use tokio_postgres::NoTls;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
const DEFAULT_ACCESS_SECS: i64 = 5 * 60;
const DEFAULT_REFRESH_SECS: i64 = 24 * 60 * 60;
const DEFAULT_POOL_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Memory,
}

#[derive(Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub rotate_refresh: bool,
}

impl fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &mask_key(&self.secret))
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("rotate_refresh", &self.rotate_refresh)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub backend: Backend,
    pub tokens: TokenSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("PORT") {
            Some(p) => p.trim().parse().context("PORT is not a valid port")?,
            None => DEFAULT_PORT,
        };

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ORIGINS.into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let backend = match lookup("DATABASE_BACKEND").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => Backend::Postgres,
            Some("memory") => Backend::Memory,
            Some(other) => bail!("unknown DATABASE_BACKEND: {}", other),
        };

        let secret = lookup("JWT_SECRET")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .context("JWT_SECRET not set")?;

        let access_secs = parse_secs(&lookup, "ACCESS_TOKEN_LIFETIME_SECS", DEFAULT_ACCESS_SECS)?;
        let refresh_secs =
            parse_secs(&lookup, "REFRESH_TOKEN_LIFETIME_SECS", DEFAULT_REFRESH_SECS)?;

        let rotate_refresh = match lookup("ROTATE_REFRESH_TOKENS") {
            Some(v) => parse_flag(&v).context("ROTATE_REFRESH_TOKENS must be true or false")?,
            None => false,
        };

        Ok(Self {
            port,
            allowed_origins,
            backend,
            tokens: TokenSettings {
                secret,
                access_ttl: Duration::seconds(access_secs),
                refresh_ttl: Duration::seconds(refresh_secs),
                rotate_refresh,
            },
        })
    }
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: i64) -> Result<i64> {
    match lookup(key) {
        Some(v) => {
            let secs: i64 = v
                .trim()
                .parse()
                .with_context(|| format!("{} is not a number", key))?;
            if secs <= 0 {
                bail!("{} must be positive", key);
            }
            Ok(secs)
        }
        None => Ok(default),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn get_pg_pool() -> Result<Pool> {
    let mut cfg = Config::new();
    cfg.host = Some(env::var("PG_HOST").context("PG_HOST not set")?);
    cfg.user = Some(env::var("PG_USER").context("PG_USER not set")?);
    cfg.password = env::var("PG_PASS").ok();
    cfg.dbname = Some(env::var("PG_DB").context("PG_DB not set")?);
    if let Ok(port) = env::var("PG_PORT") {
        cfg.port = Some(port.trim().parse().context("PG_PORT is not a valid port")?);
    }

    let max_size = match env::var("PG_POOL_MAX_SIZE") {
        Ok(v) => v.trim().parse().context("PG_POOL_MAX_SIZE is not a number")?,
        Err(_) => DEFAULT_POOL_SIZE,
    };
    cfg.pool = Some(PoolConfig::new(max_size));

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .context("failed to create postgres pool")
}

pub fn mask_key(k: &str) -> String {
    let chars: Vec<char> = k.chars().collect();
    if chars.len() <= 8 {
        "[REDACTED]".to_string()
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}***{}", head, tail)
    }
}
