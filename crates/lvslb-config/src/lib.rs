//! Configuration for the lvslb CLI.
//!
//! TOML profiles, credential resolution (vault, env, keyring, plaintext),
//! and translation to `lvslb_core::EndpointConfig`. The CLI adds
//! `GlobalOpts`-aware overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lvslb_core::{CredentialSource, EndpointConfig, TlsVerification, default_logname};

const KEYRING_SERVICE: &str = "lvslb";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in {}", path.display())]
    UnknownProfile { name: String, path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named endpoint profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_port() -> u16 {
    8080
}
fn default_vault_path() -> String {
    "lvs".into()
}

/// A named control-endpoint profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Endpoint host name or IP literal.
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub https: bool,

    /// Skip TLS peer verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Caller name sent with every action (default: `$USER`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,

    /// Plaintext password (prefer keyring or `LVSLB_PASSWORD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Override timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Read credentials from the vault instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault: Option<VaultSettings>,
}

impl Profile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            https: false,
            insecure: None,
            logname: None,
            login: None,
            password: None,
            timeout: None,
            vault: None,
        }
    }
}

/// Location of the endpoint login in the vault: `secret/{path}/{key}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VaultSettings {
    #[serde(default = "default_vault_path")]
    pub path: String,

    /// Defaults to the endpoint host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl Config {
    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                name: name.into(),
                path: config_path(),
            })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "lvslb", "lvslb").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("lvslb");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment.
///
/// Environment keys use `__` as the nesting separator, e.g.
/// `LVSLB_PROFILES__DEFAULT__HOST`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LVSLB_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

/// Store a profile password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))?;
    entry.set_password(password.expose_secret())?;
    Ok(())
}

/// Resolve the password for a static login.
///
/// `LVSLB_PASSWORD`, then the keyring, then plaintext in the profile.
/// Nothing found yields an empty password, which sends requests
/// anonymously.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> SecretString {
    // 1. Env var
    if let Ok(pw) = std::env::var("LVSLB_PASSWORD") {
        return SecretString::from(pw);
    }

    // 2. Keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name)) {
        if let Ok(pw) = entry.get_password() {
            return SecretString::from(pw);
        }
    }

    // 3. Plaintext in config
    SecretString::from(profile.password.clone().unwrap_or_default())
}

/// Decide where the endpoint credentials come from.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<CredentialSource, ConfigError> {
    if let Some(ref vault) = profile.vault {
        if profile.login.is_some() || profile.password.is_some() {
            return Err(ConfigError::Validation {
                field: "vault".into(),
                reason: "conflicts with login/password".into(),
            });
        }
        return Ok(CredentialSource::Vault {
            path: vault.path.clone(),
            key: vault.key.clone().filter(|k| !k.is_empty()),
        });
    }

    match profile.login.as_deref().filter(|l| !l.is_empty()) {
        Some(login) => Ok(CredentialSource::Static {
            login: login.to_owned(),
            password: resolve_password(profile, profile_name),
        }),
        None => Ok(CredentialSource::Anonymous),
    }
}

/// Build an `EndpointConfig` from a profile, no CLI flag overrides.
///
/// A profile without its own `timeout` takes `[defaults] timeout`.
pub fn profile_to_endpoint_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<EndpointConfig, ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        });
    }

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(EndpointConfig {
        host: profile.host.clone(),
        port: profile.port,
        https: profile.https,
        tls,
        logname: profile
            .logname
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(default_logname),
        credentials: resolve_credentials(profile, profile_name)?,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
    })
}
