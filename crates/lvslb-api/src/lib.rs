// lvslb-api: Async Rust client for the LVS load-balancer IPVS control API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;
pub mod vault;

pub use auth::BasicAuth;
pub use client::{IpvsApi, IpvsClient, endpoint_url};
pub use error::Error;
pub use models::{Action, IpvsBackend, IpvsRecord, NOT_FOUND};
pub use transport::{TlsMode, TransportConfig};
pub use vault::{VaultClient, VaultLogin};
