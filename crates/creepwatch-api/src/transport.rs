// HTTP transport construction.
//
// Sensors in the field run anything from plain HTTP on localhost to
// self-signed TLS on a remote box, so certificate verification is
// configurable per sensor. The cookie jar carries the KISMET session
// cookie between requests, so basic auth is only exchanged once.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;

use crate::error::Error;

/// TLS verification mode.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Verify against the system certificate store.
    System,
    /// Verify against a single CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed sensors).
    DangerAcceptInvalid,
}

impl TlsMode {
    fn configure(&self, builder: reqwest::ClientBuilder) -> Result<reqwest::ClientBuilder, Error> {
        match self {
            Self::System => Ok(builder),
            Self::CustomCa(path) => Ok(builder.add_root_certificate(read_ca_pem(path)?)),
            Self::DangerAcceptInvalid => Ok(builder.danger_accept_invalid_certs(true)),
        }
    }
}

fn read_ca_pem(path: &Path) -> Result<reqwest::Certificate, Error> {
    let pem = std::fs::read(path).map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
    reqwest::Certificate::from_pem(&pem).map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))
}

/// Connection tuning shared by every request a client makes.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("creepwatch/", env!("CARGO_PKG_VERSION")));

        builder = self.tls.configure(builder)?;

        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Attach a fresh cookie jar, so the session cookie the sensor sets
    /// after the first authenticated request is replayed on later ones.
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }
}
