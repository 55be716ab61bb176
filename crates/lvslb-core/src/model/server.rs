// ── Virtual-server domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Transport protocol of a virtual server.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(try_from = "String", into = "String")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Sctp,
}

/// Packet-forwarding method (`lb_kind`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(try_from = "String", into = "String")]
pub enum ForwardingKind {
    #[default]
    Nat,
    Dr,
    Tun,
}

/// Scheduling algorithm (`lb_algo`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(try_from = "String", into = "String")]
pub enum Algorithm {
    #[default]
    Wlc,
    Lc,
    Rr,
    Wrr,
    Lblc,
    Sh,
    Dh,
}

/// Backend health-check method.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(try_from = "String", into = "String")]
pub enum CheckType {
    #[default]
    TcpCheck,
    HttpGet,
    SslGet,
    MiscCheck,
    #[strum(serialize = "NONE")]
    Disabled,
}

// Desired records are hand-written TOML/JSON, so enum fields accept any
// case and serialize in their canonical wire spelling.
macro_rules! string_serde {
    ($($ty:ty),+ $(,)?) => {$(
        impl TryFrom<String> for $ty {
            type Error = strum::ParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.to_string()
            }
        }
    )+};
}

string_serde!(Protocol, ForwardingKind, Algorithm, CheckType);

fn default_check_interval() -> u32 {
    5
}

fn default_monitoring_period() -> String {
    "default".into()
}

fn default_weight() -> u32 {
    1
}

fn default_three() -> u32 {
    3
}

/// Desired state of one IPVS virtual server.
///
/// `(address, protocol, port)` is the identity: changing any of them
/// replaces the remote entity instead of modifying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VirtualServer {
    pub address: String,
    pub port: u16,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub kind: ForwardingKind,
    #[serde(default)]
    pub algorithm: Algorithm,
    /// Seconds; 0 disables persistence.
    #[serde(default)]
    pub persistence_timeout: u32,
    /// Health-check interval in seconds.
    #[serde(default = "default_check_interval")]
    pub check_interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorry_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorry_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_host: Option<String>,
    #[serde(default = "default_monitoring_period")]
    pub monitoring_period: String,
    #[serde(default)]
    pub backends: Vec<BackendGroup>,
}

impl VirtualServer {
    /// A TCP/NAT/wlc server with every other field at its default.
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
            protocol: Protocol::default(),
            kind: ForwardingKind::default(),
            algorithm: Algorithm::default(),
            persistence_timeout: 0,
            check_interval: default_check_interval(),
            sorry_address: None,
            sorry_port: None,
            virtual_host: None,
            monitoring_period: default_monitoring_period(),
            backends: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    #[must_use]
    pub fn with_backend(mut self, group: BackendGroup) -> Self {
        self.backends.push(group);
        self
    }

    /// Every backend address across all groups, in declaration order.
    pub fn backend_addresses(&self) -> impl Iterator<Item = &str> {
        self.backends
            .iter()
            .flat_map(|group| group.addresses.iter().map(String::as_str))
    }
}

/// A set of real servers sharing port, weight and health-check settings.
///
/// Each address expands into its own wire backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendGroup {
    pub addresses: Vec<String>,
    /// Unset or 0 inherits the virtual-server port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub check_type: CheckType,
    /// Unset or 0 inherits the backend port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_port: Option<u16>,
    #[serde(default = "default_three")]
    pub check_timeout: u32,
    #[serde(default = "default_three")]
    pub retries: u32,
    #[serde(default = "default_three")]
    pub retry_delay: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub misc_path: Option<String>,
}

impl BackendGroup {
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addresses: addresses.into_iter().map(Into::into).collect(),
            port: None,
            weight: default_weight(),
            check_type: CheckType::default(),
            check_port: None,
            check_timeout: default_three(),
            retries: default_three(),
            retry_delay: default_three(),
            url_path: None,
            url_digest: None,
            status_code: None,
            misc_path: None,
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }
}
