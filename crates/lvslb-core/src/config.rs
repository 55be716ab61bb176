// ── Runtime endpoint configuration ──
//
// These types describe *how* to reach a load-balancer control endpoint.
// They carry credential data and connection tuning, but never touch disk.
// The CLI builds an `EndpointConfig` from its profile and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// Where the endpoint's basic-auth credentials come from.
#[derive(Debug, Clone, Default)]
pub enum CredentialSource {
    /// No credentials: requests go out without an Authorization header.
    #[default]
    Anonymous,
    /// Login and password known up front.
    Static {
        login: String,
        password: SecretString,
    },
    /// Read `{login, password}` from the vault at connect time.
    ///
    /// `key` defaults to the endpoint host.
    Vault { path: String, key: Option<String> },
}

/// TLS verification strategy. Only meaningful with `https`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsVerification {
    #[default]
    SystemDefaults,
    /// Negotiate TLS but skip peer verification.
    DangerAcceptInvalid,
}

/// Configuration for talking to a single control endpoint.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub host: String,
    pub port: u16,
    pub https: bool,
    pub tls: TlsVerification,
    /// Caller identity passed as the `logname` query parameter.
    pub logname: String,
    pub credentials: CredentialSource,
    pub timeout: Duration,
}

impl EndpointConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            https: false,
            tls: TlsVerification::default(),
            logname: default_logname(),
            credentials: CredentialSource::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn url(&self) -> Result<Url, CoreError> {
        Ok(lvslb_api::endpoint_url(&self.host, self.port, self.https)?)
    }
}

/// `$USER`, or `"unknown"` when unset.
pub fn default_logname() -> String {
    std::env::var("USER")
        .ok()
        .filter(|user| !user.is_empty())
        .unwrap_or_else(|| "unknown".into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn url_from_parts() {
        let mut config = EndpointConfig::new("10.0.0.254", 8080);
        assert_eq!(config.url().unwrap().as_str(), "http://10.0.0.254:8080/");

        config.https = true;
        config.port = 8443;
        assert_eq!(config.url().unwrap().as_str(), "https://10.0.0.254:8443/");
    }

    #[test]
    fn defaults_are_anonymous_and_verified() {
        let config = EndpointConfig::new("lb1", 8080);
        assert!(matches!(config.credentials, CredentialSource::Anonymous));
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
        assert!(!config.logname.is_empty());
    }
}
