//! Durable settings for creepwatch.
//!
//! A TOML file layered under `CREEPWATCH_*` environment variables via
//! figment, an explicit save operation, and credential resolution
//! (env → keyring → plaintext). Settings are read once at startup and
//! only re-read after a restart — the monitor never sees them change
//! mid-poll.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use creepwatch_core::{Credentials, SensorConfig, Settings, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("username '{username}' configured but no password found (env, keyring, or config)")]
    NoCredentials { username: String },

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

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// How to reach the sensor.
    #[serde(default)]
    pub sensor: SensorSection,

    /// Tracking knobs. This reuses the core `Settings` shape verbatim so
    /// the file is the one source of truth for defaults.
    #[serde(default)]
    pub tracking: Settings,
}

/// The `[sensor]` section.
#[derive(Debug, Deserialize, Serialize)]
pub struct SensorSection {
    /// Sensor base URL (e.g., "http://localhost:2501").
    #[serde(default = "default_url")]
    pub url: String,

    /// httpd username. Leave unset for unauthenticated sensors.
    pub username: Option<String>,

    /// httpd password (plaintext — prefer keyring or `CREEPWATCH_PASSWORD`).
    pub password: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification (self-signed remote sensors).
    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for SensorSection {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: None,
            password: None,
            ca_cert: None,
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_url() -> String {
    "http://localhost:2501".into()
}
fn default_timeout() -> u64 {
    30
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "creepwatch", "creepwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("creepwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from defaults + file + environment.
///
/// Environment keys use double underscores between path segments so
/// snake_case field names survive: `CREEPWATCH_SENSOR__URL`,
/// `CREEPWATCH_TRACKING__THRESHOLD_DISTANCE`, ...
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CREEPWATCH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load from the canonical path.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config, returning defaults if the file doesn't exist or is broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to the given path.
///
/// This is the explicit save operation — running monitors keep their
/// captured settings; the new values apply on the next start.
pub fn save_config_to(cfg: &Config, path: &std::path::Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Save to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the httpd password for `username` from the credential chain.
pub fn resolve_password(section: &SensorSection, username: &str) -> Result<SecretString, ConfigError> {
    // 1. Environment
    if let Ok(pw) = std::env::var("CREEPWATCH_PASSWORD") {
        return Ok(SecretString::from(pw));
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new("creepwatch", &format!("{username}/httpd-password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = section.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        username: username.into(),
    })
}

// ── Conversion to core types ────────────────────────────────────────

/// Build a [`SensorConfig`] from the `[sensor]` section.
pub fn to_sensor_config(config: &Config) -> Result<SensorConfig, ConfigError> {
    let section = &config.sensor;

    let url: url::Url = section.url.parse().map_err(|_| ConfigError::Validation {
        field: "sensor.url".into(),
        reason: format!("invalid URL: {}", section.url),
    })?;

    let credentials = match &section.username {
        Some(username) => Some(Credentials {
            username: username.clone(),
            password: resolve_password(section, username)?,
        }),
        None => None,
    };

    let tls = if section.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = section.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(SensorConfig {
        url,
        credentials,
        tls,
        timeout: Duration::from_secs(section.timeout),
    })
}

/// The tracking settings, as a standalone value for the monitor.
pub fn to_settings(config: &Config) -> Settings {
    config.tracking.clone()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use creepwatch_core::Unit;

    use super::*;

    #[test]
    fn defaults_are_the_detector_defaults() {
        let config = Config::default();
        assert_eq!(config.sensor.url, "http://localhost:2501");
        assert!(config.sensor.username.is_none());
        assert_eq!(config.tracking.unit, Unit::Mile);
        assert!((config.tracking.threshold_distance - 0.2).abs() < f64::EPSILON);
        assert!(!config.tracking.show_only_creeps);
        assert_eq!(config.tracking.initial_window_secs, 1);
        assert_eq!(config.tracking.poll_interval_ms, 10_000);
    }

    #[test]
    fn toml_round_trip_through_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.sensor.url = "https://sensor.lan:2501".into();
        config.sensor.insecure = true;
        config.tracking.unit = Unit::Km;
        config.tracking.threshold_distance = 0.5;
        config.tracking.show_only_creeps = true;

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.sensor.url, "https://sensor.lan:2501");
        assert!(loaded.sensor.insecure);
        assert_eq!(loaded.tracking.unit, Unit::Km);
        assert!((loaded.tracking.threshold_distance - 0.5).abs() < f64::EPSILON);
        assert!(loaded.tracking.show_only_creeps);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tracking]\nthreshold_distance = 1.5\n").unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert!((loaded.tracking.threshold_distance - 1.5).abs() < f64::EPSILON);
        // everything else keeps its default
        assert_eq!(loaded.tracking.poll_interval_ms, 10_000);
        assert_eq!(loaded.sensor.url, "http://localhost:2501");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(loaded.sensor.url, "http://localhost:2501");
    }

    #[test]
    fn bad_url_is_a_validation_error() {
        let mut config = Config::default();
        config.sensor.url = "not a url".into();
        let err = to_sensor_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn insecure_flag_wins_over_ca_cert() {
        let mut config = Config::default();
        config.sensor.insecure = true;
        config.sensor.ca_cert = Some("/tmp/ca.pem".into());
        let sensor = to_sensor_config(&config).unwrap();
        assert_eq!(sensor.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn plaintext_password_resolves_when_nothing_else_is_set() {
        // The env var would shadow this; tests must not set it.
        let section = SensorSection {
            username: Some("kismet".into()),
            password: Some("hunter2".into()),
            ..SensorSection::default()
        };
        // Either the plaintext fallback resolves, or a keyring/env entry
        // took precedence — both are success paths here.
        assert!(resolve_password(&section, "kismet").is_ok());
    }
}
