//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use lvslb_config::ConfigError;
use lvslb_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CANCELLED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the control endpoint at {url}")]
    #[diagnostic(
        code(lvslb::connection_failed),
        help(
            "Check that the endpoint is running and reachable.\n\
             Use --https for TLS endpoints and --insecure (-k) for self-signed certificates."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(lvslb::timeout),
        help("Increase the timeout with --timeout or check endpoint responsiveness.")
    )]
    Timeout,

    #[error("Transport error: {message}")]
    #[diagnostic(code(lvslb::transport), help("Nothing was retried. Re-run the command."))]
    Transport { message: String },

    #[error("Interrupted")]
    #[diagnostic(
        code(lvslb::cancelled),
        help("Actions already acknowledged by the endpoint were not rolled back.")
    )]
    Cancelled,

    // ── Authentication ───────────────────────────────────────────────
    #[error("you are unauthorized")]
    #[diagnostic(
        code(lvslb::auth_failed),
        help(
            "Verify the login and password for profile '{profile}'.\n\
             Run: lvslb config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String },

    // ── Remote ───────────────────────────────────────────────────────
    #[error("{action} rejected: {message}")]
    #[diagnostic(code(lvslb::rejected))]
    Rejected { action: String, message: String },

    #[error("Malformed response from endpoint: {message}")]
    #[diagnostic(code(lvslb::malformed_response))]
    MalformedResponse { message: String },

    #[error("Virtual server {identity} not found on the endpoint")]
    #[diagnostic(
        code(lvslb::not_found),
        help("Tracking was dropped. Run: lvslb apply <FILE> to create it again.")
    )]
    NotFound { identity: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(lvslb::validation))]
    Validation { field: String, reason: String },

    #[error("{message}")]
    #[diagnostic(code(lvslb::address_family))]
    AddressFamily { message: String },

    // ── State ────────────────────────────────────────────────────────
    #[error("Nothing is tracked in {path}")]
    #[diagnostic(
        code(lvslb::not_tracked),
        help("Run: lvslb apply <FILE> first, or pass --state to point at another state file.")
    )]
    NotTracked { path: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(lvslb::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No endpoint configured")]
    #[diagnostic(
        code(lvslb::no_config),
        help(
            "Pass --host, set LVSLB_HOST, or add a profile to:\n\
             {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(lvslb::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid definition {path}: {reason}")]
    #[diagnostic(code(lvslb::definition), help("Check the file contents and try again."))]
    Definition { path: String, reason: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Transport { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::NotTracked { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::AddressFamily { .. }
            | Self::Definition { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Cancelled => exit_code::CANCELLED,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            err @ CoreError::AddressFamilyMismatch { .. } => CliError::AddressFamily {
                message: err.to_string(),
            },
            CoreError::InvalidField { field, reason } => CliError::Validation { field, reason },
            CoreError::Unauthorized => CliError::AuthFailed {
                profile: "current".into(),
            },
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::Timeout { .. } => CliError::Timeout,
            CoreError::Transport { message } => CliError::Transport { message },
            CoreError::Cancelled => CliError::Cancelled,
            CoreError::Rejected { action, message } => CliError::Rejected {
                action: action.to_string(),
                message,
            },
            err @ (CoreError::MalformedResponse { .. } | CoreError::MalformedField { .. }) => {
                CliError::MalformedResponse {
                    message: err.to_string(),
                }
            }
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}
