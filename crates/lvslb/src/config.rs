//! CLI configuration: thin wrapper around `lvslb_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--host,
//! --login, etc.) on top of the profile.

use std::time::Duration;

use secrecy::SecretString;

use lvslb_core::{CredentialSource, EndpointConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use lvslb_config::{Config, config_path, load_config_or_default, store_password};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build an `EndpointConfig` from the config file, profile, and CLI overrides.
///
/// Flags win over profile values. Without a matching profile, `--host` is
/// required.
pub fn resolve_endpoint(global: &GlobalOpts) -> Result<EndpointConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);
    let profile = cfg.profiles.get(&profile_name);

    let mut endpoint = match (profile, global.host.as_deref()) {
        (Some(profile), _) => {
            lvslb_config::profile_to_endpoint_config(profile, &profile_name, &cfg.defaults)?
        }
        (None, Some(host)) => EndpointConfig::new(host, 8080),
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(ref host) = global.host {
        endpoint.host.clone_from(host);
    }
    if let Some(port) = global.port {
        endpoint.port = port;
    }
    if global.https {
        endpoint.https = true;
    }
    if global.insecure {
        endpoint.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(timeout) = global.timeout {
        endpoint.timeout = Duration::from_secs(timeout);
    } else if profile.is_none() {
        endpoint.timeout = Duration::from_secs(cfg.defaults.timeout);
    }

    if let Some(ref login) = global.login {
        let password = match profile {
            Some(profile) => lvslb_config::resolve_password(profile, &profile_name),
            None => SecretString::from(std::env::var("LVSLB_PASSWORD").unwrap_or_default()),
        };
        endpoint.credentials = CredentialSource::Static {
            login: login.clone(),
            password,
        };
    }

    Ok(endpoint)
}
