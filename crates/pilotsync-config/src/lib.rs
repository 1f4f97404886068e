//! Configuration for the pilotsync dashboard.
//!
//! A TOML file layered over built-in defaults and under `PILOTSYNC_`
//! environment variables, translated to `pilotsync_core::DashboardConfig`.
//!
//! ```toml
//! [backend]
//! host = "localhost:8000"
//! request_timeout = "10s"
//!
//! [reconnect]
//! initial_delay = "1s"
//! max_delay = "30s"
//! ```
//!
//! Nested keys map to environment variables with `__`:
//! `PILOTSYNC_BACKEND__HOST=car.local:8000`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pilotsync_core::config::DEFAULT_HOST;
use pilotsync_core::{DashboardConfig, ReconnectConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub backend: Backend,

    #[serde(default)]
    pub reconnect: Reconnect,

    #[serde(default)]
    pub log: Log,
}

/// Where the backend lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Backend {
    /// `host[:port]` shared by the channel and control requests.
    #[serde(default = "default_host")]
    pub host: String,

    /// Use `wss`/`https`.
    #[serde(default)]
    pub secure: bool,

    #[serde(default = "default_request_timeout", with = "duration")]
    pub request_timeout: Duration,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            host: default_host(),
            secure: false,
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.into()
}
fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Channel backoff and liveness. Durations are humantime strings
/// (`"500ms"`, `"30s"`) or plain seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Reconnect {
    #[serde(with = "duration")]
    pub initial_delay: Duration,
    #[serde(with = "duration")]
    pub max_delay: Duration,
    #[serde(with = "duration")]
    pub connect_timeout: Duration,
    #[serde(with = "duration")]
    pub ping_interval: Duration,
    #[serde(with = "duration")]
    pub idle_timeout: Duration,
}

impl Default for Reconnect {
    fn default() -> Self {
        Self::from(&ReconnectConfig::default())
    }
}

impl From<&ReconnectConfig> for Reconnect {
    fn from(rc: &ReconnectConfig) -> Self {
        Self {
            initial_delay: rc.initial_delay,
            max_delay: rc.max_delay,
            connect_timeout: rc.connect_timeout,
            ping_interval: rc.ping_interval,
            idle_timeout: rc.idle_timeout,
        }
    }
}

/// Logging defaults for the binary; CLI flags override.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Log {
    /// `EnvFilter` directive used when neither `-v` nor `RUST_LOG` is set.
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Log file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Emit JSON lines instead of text.
    #[serde(default)]
    pub json: bool,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "warn".into()
}

// ── Duration (de)serialization ──────────────────────────────────────

mod duration {
    use std::fmt;
    use std::time::Duration;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        deserializer.deserialize_any(DurationVisitor)
    }

    struct DurationVisitor;

    impl Visitor<'_> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a duration like \"1s\" or \"250ms\", or whole seconds")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
            humantime::parse_duration(v.trim()).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Duration, E> {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Duration, E> {
            u64::try_from(v)
                .map(Duration::from_secs)
                .map_err(|_| E::custom("duration cannot be negative"))
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "pilotsync", "pilotsync").map_or_else(
        || PathBuf::from(".pilotsync").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the default path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` (if it exists), then `PILOTSYNC_*` env vars.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PILOTSYNC_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Validate and build the runtime configuration.
    pub fn to_dashboard_config(&self) -> Result<DashboardConfig, ConfigError> {
        let rc = &self.reconnect;

        if rc.initial_delay.is_zero() {
            return Err(ConfigError::validation(
                "reconnect.initial_delay",
                "must be greater than zero",
            ));
        }
        if rc.max_delay < rc.initial_delay {
            return Err(ConfigError::validation(
                "reconnect.max_delay",
                "must not be shorter than initial_delay",
            ));
        }
        if rc.ping_interval.is_zero() {
            return Err(ConfigError::validation(
                "reconnect.ping_interval",
                "must be greater than zero",
            ));
        }
        if rc.idle_timeout <= rc.ping_interval {
            return Err(ConfigError::validation(
                "reconnect.idle_timeout",
                "must be longer than ping_interval",
            ));
        }

        let config = DashboardConfig {
            host: self.backend.host.trim().to_owned(),
            secure: self.backend.secure,
            reconnect: ReconnectConfig {
                initial_delay: rc.initial_delay,
                max_delay: rc.max_delay,
                connect_timeout: rc.connect_timeout,
                ping_interval: rc.ping_interval,
                idle_timeout: rc.idle_timeout,
            },
            request_timeout: self.backend.request_timeout,
        };

        // Surface a bad host now rather than at connect time.
        config
            .channel_url()
            .map_err(|e| ConfigError::validation("backend.host", e.to_string()))?;

        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_runtime_defaults() {
        let config = Config::default().to_dashboard_config().unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [backend]
                host = "car.local:9000"

                [reconnect]
                initial_delay = "250ms"
                max_delay = 20
                "#,
            )?;

            let config = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.backend.host, "car.local:9000");
            assert_eq!(config.reconnect.initial_delay, Duration::from_millis(250));
            assert_eq!(config.reconnect.max_delay, Duration::from_secs(20));
            assert_eq!(config.reconnect.idle_timeout, Duration::from_secs(45));
            assert_eq!(config.backend.request_timeout, Duration::from_secs(10));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[backend]\nhost = \"car.local:9000\"\n")?;
            jail.set_env("PILOTSYNC_BACKEND__HOST", "bench:8000");
            jail.set_env("PILOTSYNC_RECONNECT__MAX_DELAY", "1m");

            let config = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.backend.host, "bench:8000");
            assert_eq!(config.reconnect.max_delay, Duration::from_secs(60));
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_| {
            let config = load_config_from(Path::new("absent.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn bad_duration_is_a_load_error() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[reconnect]\nmax_delay = \"soon\"\n")?;
            let result = load_config_from(Path::new("config.toml"));
            assert!(matches!(result, Err(ConfigError::Figment(_))));
            Ok(())
        });
    }

    #[test]
    fn validation_rejects_inverted_backoff() {
        let mut config = Config::default();
        config.reconnect.max_delay = Duration::from_millis(100);
        let err = config.to_dashboard_config().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "reconnect.max_delay"));
    }

    #[test]
    fn validation_rejects_idle_shorter_than_ping() {
        let mut config = Config::default();
        config.reconnect.idle_timeout = Duration::from_secs(5);
        let err = config.to_dashboard_config().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "reconnect.idle_timeout"));
    }

    #[test]
    fn validation_rejects_bad_host() {
        let mut config = Config::default();
        config.backend.host = "ws://localhost:8000".into();
        let err = config.to_dashboard_config().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "backend.host"));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.backend.host = "10.0.0.2:8000".into();
        config.reconnect.initial_delay = Duration::from_millis(500);
        config.log.json = true;
        save_config_to(&config, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("initial_delay = \"500ms\""), "{text}");

        let loaded: Config = toml::from_str(&text).unwrap();
        assert_eq!(loaded, config);
    }
}
