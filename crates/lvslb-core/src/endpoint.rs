// ── Endpoint session ──
//
// Turns an `EndpointConfig` into a ready `Reconciler`: resolves credentials
// (possibly from the vault), builds the HTTP client and wires in the
// caller's cancellation token.

use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lvslb_api::{BasicAuth, IpvsClient, TlsMode, TransportConfig, VaultClient, VaultLogin};

use crate::config::{CredentialSource, EndpointConfig, TlsVerification};
use crate::error::CoreError;
use crate::reconcile::Reconciler;

/// A configured, not yet connected, control endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    config: EndpointConfig,
    vault: Option<VaultClient>,
}

impl Endpoint {
    pub fn new(config: EndpointConfig) -> Self {
        Self {
            config,
            vault: None,
        }
    }

    /// Use this vault instead of one built from `VAULT_ADDR`/`VAULT_TOKEN`.
    #[must_use]
    pub fn with_vault(mut self, vault: VaultClient) -> Self {
        self.vault = Some(vault);
        self
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Resolve credentials and build a reconciler bound to this endpoint.
    ///
    /// No request reaches the control endpoint here; the first one is the
    /// first lifecycle action. Cancelling `cancel` aborts the vault lookup
    /// and every later request.
    pub async fn connect(
        &self,
        cancel: CancellationToken,
    ) -> Result<Reconciler<IpvsClient>, CoreError> {
        let transport = build_transport(&self.config);
        let url = self.config.url()?;

        let auth = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(CoreError::Cancelled),
            auth = self.resolve_auth() => auth,
        };

        let client = IpvsClient::new(url, self.config.logname.clone(), &transport)?
            .with_auth(auth)
            .with_cancellation(cancel);
        info!(
            url = %client.base_url(),
            authenticated = client.is_authenticated(),
            "endpoint ready"
        );
        Ok(Reconciler::new(client))
    }

    async fn resolve_auth(&self) -> Option<BasicAuth> {
        match &self.config.credentials {
            CredentialSource::Anonymous => None,
            CredentialSource::Static { login, password } => {
                BasicAuth::new(login.clone(), password.clone())
            }
            CredentialSource::Vault { path, key } => {
                let key = vault_key(&self.config, key.as_deref());
                let login = match &self.vault {
                    Some(vault) => read_vault_login(vault, path, key).await,
                    None => {
                        let transport =
                            TransportConfig::default().with_timeout(self.config.timeout);
                        match VaultClient::from_env(&transport) {
                            Ok(vault) => read_vault_login(&vault, path, key).await,
                            Err(e) => {
                                warn!(error = %e, "vault unavailable, continuing without credentials");
                                empty_login()
                            }
                        }
                    }
                };
                BasicAuth::new(login.login, login.password)
            }
        }
    }
}

/// The vault key for an endpoint: the configured one, else the host.
pub fn vault_key<'a>(config: &'a EndpointConfig, key: Option<&'a str>) -> &'a str {
    key.filter(|k| !k.is_empty()).unwrap_or(&config.host)
}

/// Read `secret/{path}/{key}` from the vault.
///
/// Failures are logged and yield empty credentials, which send requests
/// anonymously.
pub async fn read_vault_login(vault: &VaultClient, path: &str, key: &str) -> VaultLogin {
    match vault.read_login(path, key).await {
        Ok(Some(login)) => {
            debug!(path, key, login = %login.login, "credentials read from vault");
            login
        }
        Ok(None) => {
            warn!(path, key, "vault secret not found, continuing without credentials");
            empty_login()
        }
        Err(e) => {
            warn!(path, key, error = %e, "vault lookup failed, continuing without credentials");
            empty_login()
        }
    }
}

fn empty_login() -> VaultLogin {
    VaultLogin {
        login: String::new(),
        password: SecretString::from(String::new()),
    }
}

fn build_transport(config: &EndpointConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::Verify,
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
