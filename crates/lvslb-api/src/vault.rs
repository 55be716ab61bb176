// Vault credential lookup
//
// Reads a `{login, password}` pair from a KV v1 secret mount at
// `/v1/secret/{path}/{key}`. Address and token come from the usual
// `VAULT_ADDR` / `VAULT_TOKEN` environment, with `~/.vault-token` as the
// token fallback.

use std::collections::HashMap;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const DEFAULT_VAULT_ADDR: &str = "https://127.0.0.1:8200";

/// Credentials read from the vault.
#[derive(Debug, Clone)]
pub struct VaultLogin {
    pub login: String,
    pub password: SecretString,
}

#[derive(Deserialize)]
struct SecretResponse {
    #[serde(default)]
    data: HashMap<String, serde_json::Value>,
}

/// Minimal client for reading endpoint credentials from a vault.
#[derive(Debug, Clone)]
pub struct VaultClient {
    http: reqwest::Client,
    addr: Url,
    token: SecretString,
}

impl VaultClient {
    pub fn new(addr: Url, token: SecretString, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, addr, token))
    }

    pub fn with_client(http: reqwest::Client, addr: Url, token: SecretString) -> Self {
        Self { http, addr, token }
    }

    /// Build a client from `VAULT_ADDR` and `VAULT_TOKEN` (or `~/.vault-token`).
    pub fn from_env(transport: &TransportConfig) -> Result<Self, Error> {
        let addr = std::env::var("VAULT_ADDR").unwrap_or_else(|_| DEFAULT_VAULT_ADDR.into());
        let addr = Url::parse(&addr)?;
        let token = std::env::var("VAULT_TOKEN")
            .ok()
            .or_else(token_from_home)
            .ok_or_else(|| Error::Vault {
                status: 0,
                message: "no vault token in VAULT_TOKEN or ~/.vault-token".into(),
            })?;
        Self::new(addr, SecretString::from(token), transport)
    }

    /// Read `secret/{path}/{key}`.
    ///
    /// Returns `Ok(None)` when the secret does not exist. Missing or
    /// non-string `login`/`password` fields read as empty strings.
    pub async fn read_login(&self, path: &str, key: &str) -> Result<Option<VaultLogin>, Error> {
        let base = self.addr.as_str().trim_end_matches('/');
        let path = path.trim_matches('/');
        let url = Url::parse(&format!("{base}/v1/secret/{path}/{key}"))?;
        debug!(%url, "reading vault secret");

        let resp = self
            .http
            .get(url)
            .header("X-Vault-Token", self.token.expose_secret())
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Vault {
                status: status.as_u16(),
                message: body,
            });
        }

        let secret: SecretResponse = resp.json().await?;
        let field = |name: &str| {
            secret
                .data
                .get(name)
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };
        Ok(Some(VaultLogin {
            login: field("login"),
            password: SecretString::from(field("password")),
        }))
    }
}

fn token_from_home() -> Option<String> {
    let home = std::env::var("HOME").ok()?;
    let raw = std::fs::read_to_string(std::path::Path::new(&home).join(".vault-token")).ok()?;
    let token = raw.trim();
    (!token.is_empty()).then(|| token.to_owned())
}
