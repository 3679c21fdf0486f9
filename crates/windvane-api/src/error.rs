// Error taxonomy for the Ecowitt cloud API.
//
// The upstream service reports failures through ad hoc numeric codes, both
// as HTTP statuses and inside its `{code, msg, data}` envelope. Everything
// is normalized here into a single `Error` enum tagged with a closed
// `ErrorKind` set and a computed retryability hint. Classification is pure:
// the same code always yields the same kind.

use thiserror::Error;

// ── Error kinds ──────────────────────────────────────────────────────

/// Closed set of semantic failure categories.
///
/// Every error the crate can produce maps onto exactly one kind; the
/// gateway façade serializes the kind's wire name into its error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid or missing client configuration (keys, base URL, timeout).
    Configuration,
    /// Missing or malformed request input.
    Parameter,
    /// Device-level failure, including device-not-found.
    Device,
    /// Credential rejected by the upstream service.
    Authentication,
    /// Upstream reported itself busy (code -1) or rate limited.
    ServerBusy,
    /// Generic 4xx HTTP failure with no more specific mapping.
    Client,
    /// Generic 5xx HTTP failure.
    Server,
    /// Transport-level failure (DNS, connection refused, TLS).
    Network,
    /// The request timed out before a response arrived.
    Timeout,
    /// The upstream response body violated the envelope contract.
    DataParsing,
    /// Unexpected internal failure caught at the handler boundary.
    Handler,
    /// Anything that matched no table entry and no numeric range.
    Unknown,
}

impl ErrorKind {
    /// Stable wire name, as exposed in the gateway error envelope.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration_error",
            Self::Parameter => "parameter_error",
            Self::Device => "device_error",
            Self::Authentication => "authentication_error",
            Self::ServerBusy => "server_busy_error",
            Self::Client => "client_error",
            Self::Server => "server_error",
            Self::Network => "network_error",
            Self::Timeout => "timeout_error",
            Self::DataParsing => "data_parsing_error",
            Self::Handler => "handler_error",
            Self::Unknown => "unknown_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Upstream code classification ─────────────────────────────────────

/// Known upstream result codes: (code, kind, canonical message).
///
/// Codes outside this table fall back to the HTTP-style numeric ranges.
const CODE_TABLE: &[(i64, ErrorKind, &str)] = &[
    (-1, ErrorKind::ServerBusy, "System is busy."),
    (40000, ErrorKind::Parameter, "Illegal parameter"),
    (40010, ErrorKind::Authentication, "Illegal Application_Key Parameter"),
    (40011, ErrorKind::Authentication, "Illegal Api_Key Parameter"),
    (40012, ErrorKind::Device, "Illegal MAC/IMEI Parameter"),
    (40013, ErrorKind::Parameter, "Illegal start_date Parameter"),
    (40014, ErrorKind::Parameter, "Illegal end_date Parameter"),
    (40015, ErrorKind::Parameter, "Illegal cycle_type Parameter"),
    (40016, ErrorKind::Parameter, "Illegal call_back Parameter"),
    (40017, ErrorKind::Parameter, "Missing Application_Key Parameter"),
    (40018, ErrorKind::Parameter, "Missing Api_Key Parameter"),
    (40019, ErrorKind::Device, "Missing MAC Parameter"),
    (40020, ErrorKind::Parameter, "Missing start_date Parameter"),
    (40021, ErrorKind::Parameter, "Missing end_date Parameter"),
];

/// Classify an upstream numeric code into an [`ErrorKind`].
///
/// First match wins: the static table, then generic 4xx, then generic 5xx,
/// then `Unknown`.
pub fn classify_code(code: i64) -> ErrorKind {
    if let Some((_, kind, _)) = CODE_TABLE.iter().find(|(c, _, _)| *c == code) {
        return *kind;
    }
    match code {
        400..500 => ErrorKind::Client,
        500..600 => ErrorKind::Server,
        _ => ErrorKind::Unknown,
    }
}

/// Canonical message for a table code, if any.
pub fn canonical_message(code: i64) -> Option<&'static str> {
    CODE_TABLE
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, _, msg)| *msg)
}

/// Whether a code is worth retrying: server busy (-1), any 5xx, or 429.
///
/// 429 never appears in the upstream code table but is honored anyway so
/// rate-limited HTTP responses surface as retryable.
pub fn is_retryable_code(code: i64) -> bool {
    code == -1 || (500..600).contains(&code) || code == 429
}

// ── Error type ───────────────────────────────────────────────────────

/// Top-level error for the `windvane-api` crate.
///
/// `windvane-core` and the MCP façade propagate these unchanged; the façade
/// is the only place that serializes them into a protocol error envelope.
#[derive(Debug, Error)]
pub enum Error {
    /// Client construction or settings failure. Fail-fast: raised before
    /// any request is attempted.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Missing or malformed caller input, raised before any network call.
    #[error("{message}")]
    Parameter { message: String },

    /// No device matched the supplied address or name.
    #[error("Device not found: {query}")]
    DeviceNotFound { query: String },

    /// Upstream failure, classified from its numeric code. Covers both
    /// non-2xx HTTP statuses and non-zero envelope codes.
    #[error("Upstream API error ({code}): {message}")]
    Api {
        code: i64,
        message: String,
        kind: ErrorKind,
    },

    /// Transport failure (DNS, connection refused, TLS handshake, ...).
    #[error("Network error: {message}")]
    Network { message: String },

    /// The in-flight request was aborted when the timeout elapsed.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The response body was not a valid `{code, msg, data}` envelope.
    /// Distinct from `Network`: this is a contract violation by the
    /// upstream service, not a connectivity problem.
    #[error("Invalid API response: {message}")]
    DataParsing { message: String, body: String },

    /// Catch-all for unexpected internal failures caught at the handler
    /// boundary, so raw errors never leak to the protocol surface.
    #[error("Handler error: {message}")]
    Handler { message: String },
}

impl Error {
    /// Build a classified error from an upstream code and message.
    ///
    /// The upstream `msg` wins when present; otherwise the canonical table
    /// message, otherwise a generic fallback naming the code.
    pub fn from_upstream(code: i64, message: &str) -> Self {
        let message = if message.trim().is_empty() {
            canonical_message(code)
                .map_or_else(|| format!("Upstream error code {code}"), String::from)
        } else {
            message.to_owned()
        };
        Self::Api {
            code,
            message,
            kind: classify_code(code),
        }
    }

    /// The semantic kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Parameter { .. } => ErrorKind::Parameter,
            Self::DeviceNotFound { .. } => ErrorKind::Device,
            Self::Api { kind, .. } => *kind,
            Self::Network { .. } => ErrorKind::Network,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::DataParsing { .. } => ErrorKind::DataParsing,
            Self::Handler { .. } => ErrorKind::Handler,
        }
    }

    /// The human-readable message without any variant prefix, as exposed
    /// in the gateway error envelope.
    pub fn message(&self) -> String {
        match self {
            Self::Configuration { message }
            | Self::Parameter { message }
            | Self::Network { message }
            | Self::DataParsing { message, .. }
            | Self::Handler { message }
            | Self::Api { message, .. } => message.clone(),
            Self::DeviceNotFound { query } => format!("Device not found: {query}"),
            Self::Timeout { timeout_ms } => format!("Request timed out after {timeout_ms}ms"),
        }
    }

    /// The upstream numeric code, when one exists.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether a caller could reasonably retry this request.
    ///
    /// Upstream codes follow [`is_retryable_code`]; timeouts and transport
    /// failures are transient by nature. The crate itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { code, .. } => is_retryable_code(*code),
            Self::Timeout { .. } | Self::Network { .. } => true,
            _ => false,
        }
    }
}
