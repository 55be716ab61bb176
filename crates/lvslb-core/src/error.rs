// ── Core error types ──
//
// Domain-level errors from lvslb-core. Validation failures are raised here
// before any network call; transport-layer errors from lvslb-api are
// translated by the `From<lvslb_api::Error>` impl.

use lvslb_api::Action;
use thiserror::Error;

use crate::validate::AddressFamily;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation errors ────────────────────────────────────────────
    #[error("backend {address} isn't an {expected} for {expected} virtual server")]
    AddressFamilyMismatch {
        address: String,
        expected: AddressFamily,
    },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("you are unauthorized")]
    Unauthorized,

    #[error("Cannot reach load-balancer endpoint at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("request cancelled")]
    Cancelled,

    // ── Remote endpoint errors ───────────────────────────────────────
    /// CREATE/REMOVE/MODIFY refused; the message is the endpoint's body.
    #[error("{message}")]
    Rejected { action: Action, message: String },

    #[error("malformed response (HTTP {status}): {message}: {body}")]
    MalformedResponse {
        status: u16,
        message: String,
        body: String,
    },

    #[error("malformed response: {field} = {value:?} is not a number")]
    MalformedField { field: String, value: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Validation failures are raised before anything is sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::AddressFamilyMismatch { .. } | Self::InvalidField { .. }
        )
    }

    /// Transport failures the caller may retry; nothing here retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::Transport { .. }
        )
    }

    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<lvslb_api::Error> for CoreError {
    fn from(err: lvslb_api::Error) -> Self {
        match err {
            lvslb_api::Error::Unauthorized => CoreError::Unauthorized,
            lvslb_api::Error::Transport(ref e) => {
                let url = e.url().map(ToString::to_string).unwrap_or_default();
                if e.is_timeout() {
                    CoreError::Timeout { url }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Transport {
                        message: e.to_string(),
                    }
                }
            }
            lvslb_api::Error::Encode(e) => CoreError::Transport {
                message: format!("failed to encode request body: {e}"),
            },
            lvslb_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            lvslb_api::Error::Tls(message) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {message}"),
            },
            lvslb_api::Error::Cancelled => CoreError::Cancelled,
            lvslb_api::Error::Rejected {
                action, message, ..
            } => CoreError::Rejected { action, message },
            lvslb_api::Error::MalformedResponse {
                status,
                message,
                body,
            } => CoreError::MalformedResponse {
                status,
                message,
                body,
            },
            lvslb_api::Error::Vault { status, message } => CoreError::Config {
                message: format!("vault error (HTTP {status}): {message}"),
            },
        }
    }
}
