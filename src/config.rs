//! Runtime configuration.
//!
//! Built once at process entry and passed by reference. Values come from the
//! environment (optionally seeded by a `.env` file) under the variable names
//! the issuer agent already uses, falling back to local-development defaults.

use crate::error::ReportError;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;

/// Environment variable -> config key.
const ENV_KEYS: &[(&str, &str)] = &[
    ("STUDIO_TYPEORM_DATABASE", "database"),
    ("STUDIO_TYPEORM_USERNAME", "user"),
    ("STUDIO_TYPEORM_PASSWORD", "password"),
    ("DB_HOST", "host"),
    ("STUDIO_TYPEORM_PORT", "port"),
    ("DB_CONNECT_TIMEOUT_SECS", "connect_timeout_secs"),
    ("LOGLEVEL", "loglevel"),
];

#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(deserialize_with = "lenient_string")]
    pub database: String,
    #[serde(deserialize_with = "lenient_string")]
    pub user: String,
    #[serde(deserialize_with = "lenient_string")]
    pub password: String,
    #[serde(deserialize_with = "lenient_string")]
    pub host: String,
    pub port: u16,
    /// Seconds to wait for the connection handshake; 0 waits indefinitely.
    pub connect_timeout_secs: u64,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: "issuer_agent".to_string(),
            user: "postgres".to_string(),
            password: "secret".to_string(),
            host: "localhost".to_string(),
            port: 5574,
            connect_timeout_secs: 10,
            loglevel: "info".to_string(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("loglevel", &self.loglevel)
            .finish()
    }
}

impl Config {
    /// Defaults overlaid with the recognised environment variables.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(
            Env::raw().filter_map(|key| {
                let upper = key.as_str().to_ascii_uppercase();
                ENV_KEYS
                    .iter()
                    .find(|(env, _)| *env == upper)
                    .map(|(_, field)| (*field).into())
            }),
        )
    }

    /// Extract and validate the configuration from the environment.
    pub fn load() -> Result<Self, ReportError> {
        let cfg: Config = Self::figment().extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        if self.host.trim().is_empty() {
            return Err(ReportError::Configuration("host must not be empty".into()));
        }
        if self.database.trim().is_empty() {
            return Err(ReportError::Configuration(
                "database name must not be empty".into(),
            ));
        }
        if self.port == 0 {
            return Err(ReportError::Configuration("port must be non-zero".into()));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_secs > 0).then(|| Duration::from_secs(self.connect_timeout_secs))
    }
}

/// Env values that look numeric or boolean are parsed as such; accept them
/// back as text for string fields (e.g. an all-digit password).
fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Uint(u64),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Raw::deserialize(de)? {
        Raw::Str(s) => s,
        Raw::Uint(n) => n.to_string(),
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Bool(b) => b.to_string(),
    })
}
