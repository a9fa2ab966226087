use thiserror::Error;

/// Top-level error type for the `pidns-api` crate.
///
/// Covers every failure mode of the admin API: authentication, transport,
/// HTTP status, application-level envelope failures, and decoding.
/// `pidns-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The appliance answered 401 (missing or wrong Basic credentials).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A record id that cannot be used as a single path segment.
    #[error("Invalid record id: {id:?}")]
    InvalidId { id: String },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── HTTP ────────────────────────────────────────────────────────
    /// Non-2xx status whose body did not carry a `{success:false, error}` envelope.
    #[error("HTTP error! status: {status}")]
    Http {
        status: u16,
        /// Request path, e.g. `/api/blacklist/7`.
        path: String,
        body: String,
    },

    // ── Envelope ────────────────────────────────────────────────────
    /// `{success: false, error: "..."}` from the appliance.
    #[error("{message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error means the cached credentials were rejected.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Http { status: 404, .. } | Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the request timed out in transit.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}
