// ── Runtime connection configuration ──
//
// These types describe *how* to reach a Kismet sensor. They carry
// credential data and connection tuning, but never touch disk. The TUI
// (via creepwatch-config) constructs a `SensorConfig` and hands it in.

use secrecy::SecretString;
use url::Url;

/// Kismet httpd credentials, when the sensor requires login.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict). Default — most sensors run plain HTTP
    /// on localhost anyway.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed remote sensors).
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single Kismet sensor.
///
/// Built by the consumer, passed to `Monitor` -- core never reads config
/// files.
#[derive(Debug, Clone)]
pub struct SensorConfig {
    /// Sensor URL (e.g., `http://localhost:2501`).
    pub url: Url,
    /// httpd credentials, or `None` for unauthenticated sensors.
    pub credentials: Option<Credentials>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout; also the bound on a hung fetch.
    pub timeout: std::time::Duration,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:2501"
                .parse()
                .expect("default sensor URL is valid"),
            credentials: None,
            tls: TlsVerification::default(),
            timeout: std::time::Duration::from_secs(30),
        }
    }
}
