// Kismet REST client
//
// Wraps `reqwest::Client` with Kismet-specific URL construction, optional
// httpd basic auth, and response decoding. Device-view queries post a
// form-encoded `json={"fields": [...]}` payload; the response is a bare
// JSON array of projected records (no envelope).

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{DeviceSummary, SystemStatus, tracking_fields};
use crate::transport::TransportConfig;

/// Basic-auth credentials for a Kismet httpd instance.
#[derive(Debug, Clone)]
pub struct HttpdCredentials {
    pub username: String,
    pub password: SecretString,
}

/// Raw HTTP client for a Kismet server.
///
/// Sends httpd basic auth on every request when credentials are configured;
/// the transport's cookie jar retains the session cookie Kismet sets in
/// response, so subsequent requests ride the session.
pub struct KismetClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Option<HttpdCredentials>,
    timeout_secs: u64,
}

impl KismetClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically. `base_url` is the server root (e.g.
    /// `http://localhost:2501`).
    pub fn new(
        base_url: Url,
        credentials: Option<HttpdCredentials>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            credentials,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch the server status. Used as the connectivity and auth probe at
    /// startup.
    ///
    /// `GET /system/status.json`
    pub async fn system_status(&self) -> Result<SystemStatus, Error> {
        let url = self.endpoint_url("system/status.json")?;
        self.get(url).await
    }

    /// Fetch all devices updated since the given timestamp.
    ///
    /// `POST /devices/views/all/last-time/{since}/devices.json`
    ///
    /// `since` follows the registry convention: a positive value is an
    /// absolute epoch, a non-positive value is relative ("1" means since
    /// session start, "-60" means the last 60 seconds). The projection is
    /// fixed to [`tracking_fields`]; records with sentinel locations are
    /// returned as-is — filtering them is the caller's concern.
    pub async fn devices_since(&self, since: i64) -> Result<Vec<DeviceSummary>, Error> {
        let url = self.endpoint_url(&format!("devices/views/all/last-time/{since}/devices.json"))?;
        debug!(since, "fetching devices");
        self.post_fields(url, &tracking_fields()).await
    }

    // ── Request plumbing ─────────────────────────────────────────────

    /// Build a full URL for a server path, tolerating base URLs with or
    /// without a trailing slash.
    fn endpoint_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Send a GET request and decode the JSON response.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let mut req = self.http.get(url);
        if let Some(ref creds) = self.credentials {
            req = req.basic_auth(&creds.username, Some(creds.password.expose_secret()));
        }
        let resp = req.send().await.map_err(|e| self.transport_error(e))?;
        decode(resp).await
    }

    /// Send a POST with a form-encoded `json=<payload>` body, as the device
    /// view endpoints expect, and decode the JSON response.
    async fn post_fields<T: DeserializeOwned>(
        &self,
        url: Url,
        payload: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("POST {}", url);
        let body = serde_json::to_string(payload).map_err(|e| Error::Deserialization {
            message: format!("failed to encode request: {e}"),
            body: String::new(),
        })?;

        let mut req = self.http.post(url).form(&[("json", body)]);
        if let Some(ref creds) = self.credentials {
            req = req.basic_auth(&creds.username, Some(creds.password.expose_secret()));
        }
        let resp = req.send().await.map_err(|e| self.transport_error(e))?;
        decode(resp).await
    }

    /// Map send-time failures, promoting timeouts to their own variant.
    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(e)
        }
    }
}

/// Check the status line, then decode the body, keeping the raw text for
/// diagnostics when decoding fails.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::Authentication {
            message: "server rejected credentials (check httpd username/password)".into(),
        });
    }

    let body = resp.text().await.map_err(Error::Transport)?;

    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        });
    }

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}
