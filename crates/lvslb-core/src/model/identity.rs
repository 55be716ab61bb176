// ── Identity tracking ──
//
// An IPVS virtual server is named remotely by (address, protocol, port).
// The tracking key is derived from that triple and owned by the caller's
// persisted state; it is never held in a global.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::server::VirtualServer;

// ── IdentityKey ─────────────────────────────────────────────────────

/// Tracking key of a virtual server: `{address}_{PROTOCOL}_{port}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Build a key from a raw triple. The protocol is upper-cased.
    pub fn new(address: &str, protocol: impl fmt::Display, port: u16) -> Self {
        let protocol = protocol.to_string().to_uppercase();
        Self(format!("{address}_{protocol}_{port}"))
    }

    pub fn of(server: &VirtualServer) -> Self {
        Self::new(&server.address, server.protocol, server.port)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IdentityKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

// ── TrackedState ────────────────────────────────────────────────────

/// The caller-owned record of whether a virtual server is under management.
///
/// Reconciliation takes it by `&mut`; `id == None` means the entity is not
/// (or no longer) tracked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedState {
    pub id: Option<IdentityKey>,
}

impl TrackedState {
    pub fn tracking(server: &VirtualServer) -> Self {
        Self {
            id: Some(IdentityKey::of(server)),
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.id.is_some()
    }

    pub(crate) fn track(&mut self, server: &VirtualServer) {
        self.id = Some(IdentityKey::of(server));
    }

    pub(crate) fn forget(&mut self) {
        self.id = None;
    }
}
