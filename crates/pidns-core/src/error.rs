// ── Core error types ──
//
// User-facing errors from pidns-core. Consumers never see raw envelopes
// or JSON parse failures; the `From<pidns_api::Error>` impl translates
// transport-layer errors into the categories a person can act on.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to appliance at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    // ── Server-reported errors ───────────────────────────────────────
    /// `success:false` from the appliance; the message is shown as-is.
    #[error("{message}")]
    Rejected { message: String },

    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    #[error("Not found: {identifier}")]
    NotFound { identifier: String },

    // ── Local errors ─────────────────────────────────────────────────
    /// Bad user input caught before any request was sent.
    #[error("{message}")]
    ValidationFailed { message: String },

    #[error("Screenshot capture failed: {message}")]
    Capture { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<pidns_api::Error> for CoreError {
    fn from(err: pidns_api::Error) -> Self {
        match err {
            pidns_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            pidns_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else if let Some(status) = e.status() {
                    CoreError::Http {
                        status: status.as_u16(),
                    }
                } else {
                    CoreError::ConnectionFailed {
                        url: e.url().map(ToString::to_string).unwrap_or_default(),
                        reason: e.to_string(),
                    }
                }
            }
            pidns_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            pidns_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            pidns_api::Error::InvalidId { id } => {
                CoreError::validation(format!("Invalid id {id:?}: expected a record number"))
            }
            pidns_api::Error::Http {
                status: 404, path, ..
            } => CoreError::NotFound { identifier: path },
            pidns_api::Error::Http { status, .. } => CoreError::Http { status },
            pidns_api::Error::Api { status: _, message } => CoreError::Rejected { message },
            pidns_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
