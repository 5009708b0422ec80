//! Runtime configuration comes from the environment (a `.env` file is
//! loaded first, if present).
//!
//! - `DATABASE_URL`, or `POSTGRES_USER` / `POSTGRES_PASSWORD` /
//!   `POSTGRES_DB` (plus optional `POSTGRES_HOST`, default
//!   `localhost:5432`)
//! - `LISTEN_ADDR`, default `127.0.0.1:8000`
//! - `DB_MAX_CONNECTIONS`, default 80
//! - `RUST_LOG` for log filtering

use anyhow::{Context, Result};
use std::{env, net::SocketAddr};

/// Postgres default max connections is 100, and we'll take most of 'em
/// https://www.postgresql.org/docs/current/runtime-config-connection.html
pub const DEFAULT_MAX_CONNECTIONS: u32 = 80;
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_LOG_FILTER: &str = "rentbook=info,tower_http=info";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => {
                let var = |key: &str| {
                    lookup(key).with_context(|| {
                        format!("{key} to be defined in environment (or set DATABASE_URL)")
                    })
                };
                let host = lookup("POSTGRES_HOST")
                    .unwrap_or_else(|| "localhost:5432".to_string());
                format!(
                    "postgres://{}:{}@{}/{}",
                    var("POSTGRES_USER")?,
                    var("POSTGRES_PASSWORD")?,
                    host,
                    var("POSTGRES_DB")?
                )
            }
        };
        let listen_addr: SocketAddr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("LISTEN_ADDR must be a socket address, i.e, 0.0.0.0:5000")?;
        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(n) => n.parse::<u32>().context("DB_MAX_CONNECTIONS must be a number")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            listen_addr,
            max_connections,
        })
    }
}
