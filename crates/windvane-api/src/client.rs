// HTTP client for the Ecowitt cloud API.
//
// Wraps `reqwest::Client` with credential injection, base-URL joining,
// envelope unwrapping, and taxonomy classification. Every endpoint is a
// thin wrapper over `get_data`; the envelope is stripped before callers
// see a payload.
//
// Secrets: both credential tokens travel as query parameters, so the full
// request URL is sensitive. It is never logged, and reqwest errors are
// stripped of their URL (`without_url`) before their message is captured.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::mac::DeviceIdentifier;
use crate::models::{ApiEnvelope, DeviceSummary, DevicesPayload};
use crate::units::{CycleType, UnitOptions};

/// Public upstream endpoint, used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.ecowitt.net/api/v3";

/// Default request timeout when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Upper bound on the configurable request timeout.
pub const MAX_TIMEOUT_MS: u64 = 300_000;

// ── Configuration ────────────────────────────────────────────────────

/// The two static credential tokens every request carries.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub application_key: SecretString,
    pub api_key: SecretString,
}

/// Everything needed to construct a [`WeatherClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials: Credentials,
    /// Absolute base URL of the upstream API.
    pub base_url: Url,
    /// Per-request timeout; must be positive and at most [`MAX_TIMEOUT_MS`].
    pub timeout: Duration,
    /// User-agent string, injected at startup rather than read from any
    /// packaging artifact at runtime.
    pub user_agent: String,
}

impl ClientConfig {
    /// Config with the public endpoint and default timeout.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_agent: format!("windvane/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Ecowitt cloud API.
///
/// Construction is fail-fast: missing keys or an out-of-range timeout
/// refuse to build a client at all. The instance holds the validated
/// config for its lifetime and never mutates it; concurrent requests
/// share nothing mutable.
#[derive(Debug)]
pub struct WeatherClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl WeatherClient {
    /// Validate the config and build the client.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        if config.credentials.application_key.expose_secret().is_empty() {
            return Err(Error::Configuration {
                message: "application key is required".into(),
            });
        }
        if config.credentials.api_key.expose_secret().is_empty() {
            return Err(Error::Configuration {
                message: "API key is required".into(),
            });
        }
        let timeout_ms = u64::try_from(config.timeout.as_millis()).unwrap_or(u64::MAX);
        if timeout_ms == 0 || timeout_ms > MAX_TIMEOUT_MS {
            return Err(Error::Configuration {
                message: format!(
                    "timeout must be between 1 and {MAX_TIMEOUT_MS} milliseconds, got {timeout_ms}"
                ),
            });
        }
        if config.base_url.cannot_be_a_base() {
            return Err(Error::Configuration {
                message: "base URL must be an absolute http(s) URL".into(),
            });
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Configuration {
                message: format!("failed to build HTTP client: {}", e.without_url()),
            })?;

        Ok(Self { http, config })
    }

    /// The configured per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join `path` onto the base with exactly one separator, then append
    /// the credential parameters followed by `params`.
    fn endpoint_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, Error> {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let mut url = Url::parse(&format!("{base}/{path}")).map_err(|e| Error::Configuration {
            message: format!("invalid endpoint URL: {e}"),
        })?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair(
                "application_key",
                self.config.credentials.application_key.expose_secret(),
            );
            query.append_pair("api_key", self.config.credentials.api_key.expose_secret());
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }

    // ── Request execution ────────────────────────────────────────────

    /// Perform a GET against `path`, unwrap the envelope, and classify
    /// every failure mode.
    ///
    /// The per-request timeout races against the response; on elapse,
    /// reqwest aborts the in-flight call before the error is returned, so
    /// no connection outlives its request.
    async fn get_data(&self, path: &str, params: &[(&str, String)]) -> Result<Value, Error> {
        let url = self.endpoint_url(path, params)?;
        let timeout_ms = u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX);
        debug!(path, "GET");

        let resp = match self
            .http
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => return Err(Error::Timeout { timeout_ms }),
            Err(e) => {
                return Err(Error::Network {
                    message: e.without_url().to_string(),
                });
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("HTTP error");
            return Err(Error::from_upstream(i64::from(status.as_u16()), reason));
        }

        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => return Err(Error::Timeout { timeout_ms }),
            Err(e) => {
                return Err(Error::Network {
                    message: e.without_url().to_string(),
                });
            }
        };

        let envelope: ApiEnvelope =
            serde_json::from_str(&body).map_err(|e| Error::DataParsing {
                message: e.to_string(),
                body: body.chars().take(200).collect(),
            })?;

        if envelope.code != 0 {
            return Err(Error::from_upstream(envelope.code, &envelope.msg));
        }

        Ok(envelope.data.unwrap_or(Value::Null))
    }

    // ━━ Endpoints ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// List all stations bound to the account.
    ///
    /// `GET /device/list` — an absent `list` field yields an empty vec,
    /// as does a success envelope with null or missing `data`.
    pub async fn list_devices(&self) -> Result<Vec<DeviceSummary>, Error> {
        let data = self.get_data("device/list", &[]).await?;
        if data.is_null() {
            return Ok(Vec::new());
        }
        let payload: DevicesPayload =
            serde_json::from_value(data).map_err(|e| Error::DataParsing {
                message: format!("unexpected device list shape: {e}"),
                body: String::new(),
            })?;
        Ok(payload.list)
    }

    /// Raw detail payload for one station.
    ///
    /// `GET /device/info` — an empty object is how the upstream reports an
    /// unknown address; interpreting that is the caller's concern.
    pub async fn get_device_detail(&self, id: &DeviceIdentifier) -> Result<Value, Error> {
        let (name, value) = id.query_param();
        self.get_data("device/info", &[(name, value.to_owned())])
            .await
    }

    /// Latest real-time readings for one station.
    ///
    /// `GET /device/real_time` — `call_back` filters the returned field
    /// groups (comma-separated, e.g. `"outdoor,wind"`).
    pub async fn get_realtime(
        &self,
        id: &DeviceIdentifier,
        call_back: Option<&str>,
        units: &UnitOptions,
    ) -> Result<Value, Error> {
        let (name, value) = id.query_param();
        let mut params = vec![(name, value.to_owned())];
        if let Some(filter) = call_back {
            params.push(("call_back", filter.to_owned()));
        }
        units.append_to(&mut params);
        self.get_data("device/real_time", &params).await
    }

    /// Historical readings over a date span.
    ///
    /// `GET /device/history` — dates in `"YYYY-MM-DD HH:mm:ss"` form are
    /// passed through unmodified; the upstream validates them and answers
    /// with its own parameter codes when they are malformed.
    pub async fn get_history(
        &self,
        id: &DeviceIdentifier,
        start_date: &str,
        end_date: &str,
        call_back: &str,
        cycle_type: Option<CycleType>,
        units: &UnitOptions,
    ) -> Result<Value, Error> {
        let (name, value) = id.query_param();
        let mut params = vec![
            (name, value.to_owned()),
            ("start_date", start_date.to_owned()),
            ("end_date", end_date.to_owned()),
            ("call_back", call_back.to_owned()),
        ];
        if let Some(cycle) = cycle_type {
            params.push(("cycle_type", cycle.to_string()));
        }
        units.append_to(&mut params);
        self.get_data("device/history", &params).await
    }
}
