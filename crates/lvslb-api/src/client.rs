// IPVS control API HTTP client
//
// Wraps `reqwest::Client` with endpoint URL construction, basic auth,
// cancellation, and the status-code conventions of the control endpoint.
// One call is one POST; nothing is retried or cached.

use std::future::Future;

use reqwest::StatusCode;
use reqwest::header::{CONNECTION, CONTENT_TYPE};
use secrecy::ExposeSecret;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::auth::BasicAuth;
use crate::error::Error;
use crate::models::{Action, IpvsRecord};
use crate::transport::TransportConfig;

/// Anything that can carry one control action to the endpoint.
///
/// The reconciler in `lvslb-core` is generic over this trait so its
/// ordering rules can be exercised without a network.
pub trait IpvsApi: Send + Sync {
    /// Send `record` for `action` and interpret the answer.
    ///
    /// CREATE/REMOVE/MODIFY yield an empty record on success. CHECK yields
    /// the decoded record, or [`IpvsRecord::absent`] when the endpoint
    /// answered 404.
    fn execute(
        &self,
        action: Action,
        record: &IpvsRecord,
    ) -> impl Future<Output = Result<IpvsRecord, Error>> + Send;
}

/// Build the endpoint root URL: `{scheme}://{host}:{port}`.
pub fn endpoint_url(host: &str, port: u16, https: bool) -> Result<Url, Error> {
    let scheme = if https { "https" } else { "http" };
    let host = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]")
    } else {
        host.to_owned()
    };
    Ok(Url::parse(&format!("{scheme}://{host}:{port}"))?)
}

/// Raw HTTP client for the IPVS control endpoint.
pub struct IpvsClient {
    http: reqwest::Client,
    base_url: Url,
    /// Caller identity, sent as the `logname` query parameter for the
    /// endpoint's audit log.
    logname: String,
    auth: Option<BasicAuth>,
    cancel: CancellationToken,
}

impl IpvsClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the endpoint root, e.g. `https://10.0.0.254:8080`.
    pub fn new(
        base_url: Url,
        logname: impl Into<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, logname))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, logname: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            logname: logname.into(),
            auth: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach basic credentials. `None` keeps the client anonymous.
    pub fn with_auth(mut self, auth: Option<BasicAuth>) -> Self {
        self.auth = auth;
        self
    }

    /// Abort in-flight requests when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The endpoint root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn logname(&self) -> &str {
        &self.logname
    }

    /// Whether requests carry basic credentials.
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Full URL of `action` for `record`'s identity fields:
    /// `{base}/{prefix}/{PROTOCOL}/{IP}/{Port}/?&logname={name}`
    pub(crate) fn action_url(&self, action: Action, record: &IpvsRecord) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let logname: String =
            url::form_urlencoded::byte_serialize(self.logname.as_bytes()).collect();
        let full = format!("{base}{}?&logname={logname}", record.action_path(action));
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// POST the record and return the raw status and body text.
    async fn send(&self, action: Action, record: &IpvsRecord) -> Result<(StatusCode, String), Error> {
        let url = self.action_url(action, record)?;
        let body = serde_json::to_string(record)?;
        debug!(%action, method = "POST", %url, %body, "request API");

        let mut builder = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .header(CONNECTION, "close")
            .body(body);
        if let Some(ref auth) = self.auth {
            builder = builder.basic_auth(auth.login(), Some(auth.password().expose_secret()));
        }

        let exchange = async {
            let resp = builder.send().await?;
            let status = resp.status();
            let text = resp.text().await?;
            Ok::<_, Error>((status, text))
        };

        let (status, text) = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                warn!(%action, %url, "request cancelled");
                return Err(Error::Cancelled);
            }
            result = exchange => result?,
        };

        debug!(%action, %url, status = status.as_u16(), body = %text, "response API");
        Ok((status, text))
    }

    // ── Typed actions ────────────────────────────────────────────────

    /// `POST /add_ipvs/{PROTOCOL}/{IP}/{Port}/`
    pub async fn create(&self, record: &IpvsRecord) -> Result<(), Error> {
        self.execute(Action::Create, record).await.map(drop)
    }

    /// `POST /remove_ipvs/{PROTOCOL}/{IP}/{Port}/`
    pub async fn remove(&self, record: &IpvsRecord) -> Result<(), Error> {
        self.execute(Action::Remove, record).await.map(drop)
    }

    /// `POST /change_ipvs/{PROTOCOL}/{IP}/{Port}/`
    pub async fn modify(&self, record: &IpvsRecord) -> Result<(), Error> {
        self.execute(Action::Modify, record).await.map(drop)
    }

    /// `POST /check_ipvs/{PROTOCOL}/{IP}/{Port}/`
    ///
    /// Returns [`IpvsRecord::absent`] when the endpoint answers 404.
    pub async fn check(&self, record: &IpvsRecord) -> Result<IpvsRecord, Error> {
        self.execute(Action::Check, record).await
    }
}

impl IpvsApi for IpvsClient {
    async fn execute(&self, action: Action, record: &IpvsRecord) -> Result<IpvsRecord, Error> {
        let (status, body) = self.send(action, record).await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }

        match action {
            Action::Check => {
                if status == StatusCode::NOT_FOUND {
                    return Ok(IpvsRecord::absent());
                }
                if status != StatusCode::OK {
                    warn!(status = status.as_u16(), "check answered with unexpected status");
                }
                serde_json::from_str(&body).map_err(|e| Error::MalformedResponse {
                    status: status.as_u16(),
                    message: e.to_string(),
                    body,
                })
            }
            Action::Create | Action::Remove | Action::Modify => {
                if status != StatusCode::OK {
                    return Err(Error::Rejected {
                        action,
                        status: status.as_u16(),
                        message: body,
                    });
                }
                Ok(IpvsRecord::default())
            }
        }
    }
}
