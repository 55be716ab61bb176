// IPVS control API wire types
//
// The endpoint's schema is string-typed throughout: ports, weights and
// timers all travel as decimal strings. These structs mirror it field for
// field; conversion to and from native types happens in `lvslb-core`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Marker the client writes into the identity fields of a CHECK result
/// when the endpoint reports the virtual server as absent (HTTP 404).
pub const NOT_FOUND: &str = "null";

// ── Action ──────────────────────────────────────────────────────────

/// One control action understood by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Declare and apply a new virtual server.
    Create,
    /// Remove an existing virtual server.
    Remove,
    /// Read back the current state of a virtual server.
    Check,
    /// Modify a virtual server in place.
    Modify,
}

impl Action {
    /// Fixed URL prefix of the action's endpoint.
    pub fn path_prefix(self) -> &'static str {
        match self {
            Self::Create => "add_ipvs",
            Self::Remove => "remove_ipvs",
            Self::Check => "check_ipvs",
            Self::Modify => "change_ipvs",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "CREATE",
            Self::Remove => "REMOVE",
            Self::Check => "CHECK",
            Self::Modify => "MODIFY",
        })
    }
}

// ── Records ─────────────────────────────────────────────────────────

/// Full virtual-server record, sent as the body of every action and
/// returned by CHECK.
///
/// Every field defaults to the empty string on decode because the endpoint
/// is not consistent about field presence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpvsRecord {
    #[serde(rename = "IP", default)]
    pub ip: String,
    #[serde(rename = "Port", default)]
    pub port: String,
    #[serde(rename = "Protocol", default)]
    pub protocol: String,
    #[serde(rename = "Delay_loop", default)]
    pub delay_loop: String,
    #[serde(rename = "Lb_algo", default)]
    pub lb_algo: String,
    #[serde(rename = "Lb_kind", default)]
    pub lb_kind: String,
    #[serde(rename = "Persistence_timeout", default)]
    pub persistence_timeout: String,
    #[serde(rename = "Sorry_IP", default)]
    pub sorry_ip: String,
    #[serde(rename = "Sorry_port", default)]
    pub sorry_port: String,
    #[serde(rename = "Backends", default, deserialize_with = "null_as_empty")]
    pub backends: Vec<IpvsBackend>,
    #[serde(rename = "Virtualhost", default)]
    pub virtualhost: String,
    #[serde(rename = "Mon_period", default)]
    pub mon_period: String,
}

/// One real server in the pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpvsBackend {
    #[serde(rename = "IP", default)]
    pub ip: String,
    #[serde(rename = "Port", default)]
    pub port: String,
    #[serde(rename = "Weight", default)]
    pub weight: String,
    #[serde(rename = "Check_type", default)]
    pub check_type: String,
    #[serde(rename = "Check_port", default)]
    pub check_port: String,
    #[serde(rename = "Check_timeout", default)]
    pub check_timeout: String,
    #[serde(rename = "Nb_get_retry", default)]
    pub nb_get_retry: String,
    #[serde(rename = "Delay_before_retry", default)]
    pub delay_before_retry: String,
    #[serde(rename = "Url_path", default)]
    pub url_path: String,
    #[serde(rename = "Url_digest", default)]
    pub url_digest: String,
    #[serde(rename = "Url_status_code", default)]
    pub url_status_code: String,
    #[serde(rename = "Misc_path", default)]
    pub misc_path: String,
}

impl IpvsRecord {
    /// The sentinel record a CHECK yields for an absent virtual server.
    pub fn absent() -> Self {
        Self {
            ip: NOT_FOUND.into(),
            port: NOT_FOUND.into(),
            protocol: NOT_FOUND.into(),
            ..Self::default()
        }
    }

    /// Whether this record is the absent sentinel.
    pub fn is_absent(&self) -> bool {
        self.ip == NOT_FOUND
    }

    /// URL path of `action` for this record's own identity fields:
    /// `/{prefix}/{PROTOCOL}/{IP}/{Port}/`.
    pub fn action_path(&self, action: Action) -> String {
        format!(
            "/{}/{}/{}/{}/",
            action.path_prefix(),
            self.protocol,
            self.ip,
            self.port
        )
    }
}

/// The endpoint encodes an empty pool as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<IpvsBackend>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<IpvsBackend>>::deserialize(deserializer)?.unwrap_or_default())
}
