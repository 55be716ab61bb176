// ── Domain model ──
//
// Native-typed virtual-server records. The wire format lives in
// `lvslb_api::models`; `crate::convert` is the only bridge between the two.

pub mod identity;
pub mod observed;
pub mod server;

pub use identity::{IdentityKey, TrackedState};
pub use observed::{ObservedBackend, ObservedVirtualServer};
pub use server::{Algorithm, BackendGroup, CheckType, ForwardingKind, Protocol, VirtualServer};
