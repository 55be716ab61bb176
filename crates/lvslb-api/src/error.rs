use thiserror::Error;

use crate::models::Action;

/// Top-level error type for the `lvslb-api` crate.
///
/// Covers every failure mode of a single control-API round trip:
/// authentication, transport, response decoding, and remote rejection.
/// `lvslb-core` maps these into domain-level errors.
///
/// A CHECK answered with HTTP 404 is *not* an error; it comes back as the
/// sentinel absent record (see [`IpvsRecord::is_absent`](crate::IpvsRecord::is_absent)).
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The endpoint answered HTTP 401.
    #[error("you are unauthorized")]
    Unauthorized,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, body read, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The caller cancelled the in-flight request.
    #[error("request cancelled")]
    Cancelled,

    // ── Remote endpoint ─────────────────────────────────────────────
    /// The endpoint refused a CREATE/REMOVE/MODIFY. The message is the
    /// response body verbatim, which the endpoint fills with readable text.
    #[error("{message}")]
    Rejected {
        action: Action,
        status: u16,
        message: String,
    },

    /// The vault answered a secret read with a non-success status.
    #[error("vault error (HTTP {status}): {message}")]
    Vault { status: u16, message: String },

    /// A CHECK response body did not decode as an IPVS record.
    #[error("decode json API response ({message}) (HTTP {status}): {body}")]
    MalformedResponse {
        status: u16,
        message: String,
        body: String,
    },
}

impl Error {
    /// Returns `true` if this error indicates the endpoint rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Returns `true` if this is a transport-level failure the caller may retry.
    ///
    /// The client itself never retries.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_body(),
            _ => false,
        }
    }

    /// HTTP status attached to the error, if the endpoint answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Rejected { status, .. }
            | Self::MalformedResponse { status, .. }
            | Self::Vault { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
