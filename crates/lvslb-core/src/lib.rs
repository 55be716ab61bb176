// lvslb-core: Reconciliation engine for IPVS virtual servers
//
// Sits between `lvslb-api` (string-typed wire records over HTTP) and the
// `lvslb` CLI. Owns the native domain model, local validation, payload
// assembly, and the ordering rules that map lifecycle events onto control
// actions.

pub mod config;
pub mod convert;
pub mod endpoint;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{CredentialSource, EndpointConfig, TlsVerification, default_logname};
pub use convert::{assemble, observe};
pub use endpoint::Endpoint;
pub use error::CoreError;
pub use model::{
    Algorithm, BackendGroup, CheckType, ForwardingKind, IdentityKey, ObservedBackend,
    ObservedVirtualServer, Protocol, TrackedState, VirtualServer,
};
pub use reconcile::{
    ReadOutcome, Reconciler, ReplaceReason, ReplaceStep, Replacement, UpdatePlan, plan_update,
};
pub use validate::{AddressFamily, validate, validate_address_family, validate_ranges};

// Re-export the transport seam so callers need not depend on lvslb-api.
pub use lvslb_api::{Action, IpvsApi, IpvsClient};
