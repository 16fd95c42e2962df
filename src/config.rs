use std::env;
use std::net::SocketAddr;

use anyhow::{anyhow, Context};
use simplelog::LevelFilter;

/// Server settings, read from the environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // No database url means the in-memory store
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_duration: i64,
    pub listen_addr: SocketAddr,
    pub log_level: LevelFilter,
    pub max_active_games: usize,
    pub cpu_autoplay: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup, `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("${key} is not set"));

        let token_duration = required("TOKEN_DURATION")?
            .parse::<i64>()
            .context("$TOKEN_DURATION is not numeric")?;

        let listen_addr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .context("$LISTEN_ADDR is not a socket address")?;

        let log_level = lookup("LOG_LEVEL")
            .unwrap_or_else(|| "debug".to_string())
            .parse::<LevelFilter>()
            .context("$LOG_LEVEL is not a log level")?;

        let max_active_games = match lookup("MAX_ACTIVE_GAMES") {
            Some(v) => v.parse::<usize>().context("$MAX_ACTIVE_GAMES is not numeric")?,
            None => 3,
        };

        let cpu_autoplay = match lookup("CPU_AUTOPLAY").as_deref() {
            None => true,
            Some("1" | "true" | "yes" | "on") => true,
            Some("0" | "false" | "no" | "off") => false,
            Some(other) => return Err(anyhow!("$CPU_AUTOPLAY has an unexpected value {other:?}")),
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            jwt_secret: required("JWT_SECRET")?,
            token_duration,
            listen_addr,
            log_level,
            max_active_games,
            cpu_autoplay,
        })
    }
}
