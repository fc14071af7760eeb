//! Settings read from environment variables (optionally via `.env`).
//!
//! | Variable | Default |
//! |---|---|
//! | `DATABASE_URL` | unset: in-memory store |
//! | `BIND_ADDR` | `0.0.0.0:5000` |
//! | `API_PREFIX` | empty |
//! | `DB_MAX_CONNECTIONS` | `5` |
//! | `BODY_LIMIT_BYTES` | `1048576` |
//! | `CORS_ALLOW_ORIGIN` | `*` |

use crate::error::ConfigError;
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub enum CorsOrigin {
    Any,
    Exact(HeaderValue),
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Postgres connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    /// Path prefix for the product routes, e.g. `/api`. Empty mounts them at the root.
    pub api_prefix: String,
    pub db_max_connections: u32,
    pub body_limit_bytes: usize,
    pub cors_allow_origin: CorsOrigin,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            api_prefix: String::new(),
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            cors_allow_origin: CorsOrigin::Any,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = SocketAddr::from_str(&bind_addr).map_err(|e| ConfigError::Invalid {
            key: "BIND_ADDR",
            message: e.to_string(),
        })?;

        let api_prefix = match get("API_PREFIX") {
            None => String::new(),
            Some(p) if p == "/" => String::new(),
            Some(p) if p.starts_with('/') => p.trim_end_matches('/').to_string(),
            Some(p) => {
                return Err(ConfigError::Invalid {
                    key: "API_PREFIX",
                    message: format!("'{}' must start with '/'", p),
                })
            }
        };

        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), DEFAULT_MAX_CONNECTIONS)?;
        if db_max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                message: "must be at least 1".into(),
            });
        }
        let body_limit_bytes = parse_or("BODY_LIMIT_BYTES", get("BODY_LIMIT_BYTES"), DEFAULT_BODY_LIMIT_BYTES)?;

        let cors_allow_origin = match get("CORS_ALLOW_ORIGIN") {
            None => CorsOrigin::Any,
            Some(o) if o == "*" => CorsOrigin::Any,
            Some(o) => CorsOrigin::Exact(HeaderValue::from_str(&o).map_err(|e| ConfigError::Invalid {
                key: "CORS_ALLOW_ORIGIN",
                message: e.to_string(),
            })?),
        };

        Ok(Self {
            database_url: get("DATABASE_URL"),
            bind_addr,
            api_prefix,
            db_max_connections,
            body_limit_bytes,
            cors_allow_origin,
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(s) => s.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let s = from_pairs(&[]).unwrap();
        assert_eq!(s.database_url, None);
        assert_eq!(s.bind_addr.port(), 5000);
        assert_eq!(s.api_prefix, "");
        assert_eq!(s.db_max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(s.cors_allow_origin, CorsOrigin::Any);
    }

    #[test]
    fn reads_overrides() {
        let s = from_pairs(&[
            ("DATABASE_URL", "postgres://localhost/products"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("API_PREFIX", "/api/"),
            ("DB_MAX_CONNECTIONS", "12"),
            ("CORS_ALLOW_ORIGIN", "http://localhost:5173"),
        ])
        .unwrap();
        assert_eq!(s.database_url.as_deref(), Some("postgres://localhost/products"));
        assert_eq!(s.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(s.api_prefix, "/api");
        assert_eq!(s.db_max_connections, 12);
        assert_eq!(
            s.cors_allow_origin,
            CorsOrigin::Exact(HeaderValue::from_static("http://localhost:5173"))
        );
    }

    #[test]
    fn blank_database_url_means_unset() {
        let s = from_pairs(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(s.database_url.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(from_pairs(&[("BIND_ADDR", "nowhere")]).is_err());
        assert!(from_pairs(&[("API_PREFIX", "api")]).is_err());
        assert!(from_pairs(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(from_pairs(&[("BODY_LIMIT_BYTES", "lots")]).is_err());
    }
}
