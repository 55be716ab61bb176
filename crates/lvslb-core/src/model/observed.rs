// ── Observed state ──
//
// What a CHECK reports back. Enum-like fields stay strings: the endpoint is
// the source of truth here and a placeholder backend carries empty values.

use serde::Serialize;

/// A virtual server as reported by the remote endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObservedVirtualServer {
    pub address: String,
    pub port: u16,
    pub protocol: String,
    pub kind: String,
    pub algorithm: String,
    pub persistence_timeout: u32,
    pub check_interval: u32,
    pub sorry_address: String,
    pub sorry_port: u16,
    pub virtual_host: String,
    pub monitoring_period: String,
    pub backends: Vec<ObservedBackend>,
}

impl ObservedVirtualServer {
    /// The endpoint answered with no real servers at all.
    ///
    /// Distinguishes a pool emptied remotely from one never configured,
    /// which would not have been created in the first place.
    pub fn pool_emptied(&self) -> bool {
        matches!(self.backends.as_slice(), [only] if only.is_placeholder())
    }
}

/// One real server as reported by the remote endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObservedBackend {
    pub address: String,
    pub port: u16,
    pub weight: u32,
    pub check_type: String,
    pub check_port: u16,
    pub check_timeout: u32,
    pub retries: u32,
    pub retry_delay: u32,
    pub url_path: String,
    pub url_digest: String,
    pub status_code: u16,
    pub misc_path: String,
}

impl ObservedBackend {
    /// All-zero/empty stand-in used when a read returns no backends.
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_placeholder(&self) -> bool {
        *self == Self::default()
    }
}
