// ── Domain-to-wire conversions ──
//
// The only place numbers become decimal strings and back. `assemble` turns a
// desired `VirtualServer` into the string-typed `IpvsRecord` the endpoint
// expects, applying port inheritance; `observe` parses a CHECK response into
// native fields.

use std::str::FromStr;

use lvslb_api::{IpvsBackend, IpvsRecord};

use crate::error::CoreError;
use crate::model::{BackendGroup, ObservedBackend, ObservedVirtualServer, VirtualServer};

// ── Port inheritance ───────────────────────────────────────────────

/// Explicit non-zero backend port, else the virtual-server port.
pub fn backend_port(vs_port: u16, group: &BackendGroup) -> u16 {
    group.port.filter(|p| *p != 0).unwrap_or(vs_port)
}

/// Explicit non-zero check port, else the backend port as resolved above.
pub fn check_port(vs_port: u16, group: &BackendGroup) -> u16 {
    group
        .check_port
        .filter(|p| *p != 0)
        .unwrap_or_else(|| backend_port(vs_port, group))
}

/// Unset and 0 both go out as an empty string.
pub fn status_code_wire(code: Option<u16>) -> String {
    code.filter(|c| *c != 0)
        .map(|c| c.to_string())
        .unwrap_or_default()
}

// ── Assembly ───────────────────────────────────────────────────────

fn assemble_group(vs_port: u16, group: &BackendGroup) -> impl Iterator<Item = IpvsBackend> + '_ {
    let port = backend_port(vs_port, group).to_string();
    let check_port = check_port(vs_port, group).to_string();

    group.addresses.iter().map(move |address| IpvsBackend {
        ip: address.clone(),
        port: port.clone(),
        weight: group.weight.to_string(),
        check_type: group.check_type.to_string(),
        check_port: check_port.clone(),
        check_timeout: group.check_timeout.to_string(),
        nb_get_retry: group.retries.to_string(),
        delay_before_retry: group.retry_delay.to_string(),
        url_path: group.url_path.clone().unwrap_or_default(),
        url_digest: group.url_digest.clone().unwrap_or_default(),
        url_status_code: status_code_wire(group.status_code),
        misc_path: group.misc_path.clone().unwrap_or_default(),
    })
}

/// Build the wire record for a desired virtual server.
///
/// Each `(group, address)` pair becomes one wire backend sharing the
/// group's settings.
pub fn assemble(server: &VirtualServer) -> IpvsRecord {
    IpvsRecord {
        ip: server.address.clone(),
        port: server.port.to_string(),
        protocol: server.protocol.to_string(),
        delay_loop: server.check_interval.to_string(),
        lb_algo: server.algorithm.to_string(),
        lb_kind: server.kind.to_string(),
        persistence_timeout: server.persistence_timeout.to_string(),
        sorry_ip: server.sorry_address.clone().unwrap_or_default(),
        sorry_port: server.sorry_port.unwrap_or(0).to_string(),
        backends: server
            .backends
            .iter()
            .flat_map(|group| assemble_group(server.port, group))
            .collect(),
        virtualhost: server.virtual_host.clone().unwrap_or_default(),
        mon_period: server.monitoring_period.clone(),
    }
}

/// Point a record at another server's identity triple.
///
/// Used to REMOVE the prior entity while sending the new payload.
#[must_use]
pub fn retarget(mut record: IpvsRecord, identity: &VirtualServer) -> IpvsRecord {
    record.ip.clone_from(&identity.address);
    record.port = identity.port.to_string();
    record.protocol = identity.protocol.to_string();
    record
}

// ── Observation ────────────────────────────────────────────────────

fn number<T>(field: &str, raw: &str) -> Result<T, CoreError>
where
    T: FromStr + Default,
{
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse().map_err(|_| CoreError::MalformedField {
        field: field.to_owned(),
        value: raw.to_owned(),
    })
}

fn observe_backend(backend: &IpvsBackend) -> Result<ObservedBackend, CoreError> {
    Ok(ObservedBackend {
        address: backend.ip.clone(),
        port: number("Backends.Port", &backend.port)?,
        weight: number("Backends.Weight", &backend.weight)?,
        check_type: backend.check_type.clone(),
        check_port: number("Backends.Check_port", &backend.check_port)?,
        check_timeout: number("Backends.Check_timeout", &backend.check_timeout)?,
        retries: number("Backends.Nb_get_retry", &backend.nb_get_retry)?,
        retry_delay: number("Backends.Delay_before_retry", &backend.delay_before_retry)?,
        url_path: backend.url_path.clone(),
        url_digest: backend.url_digest.clone(),
        status_code: number("Backends.Url_status_code", &backend.url_status_code)?,
        misc_path: backend.misc_path.clone(),
    })
}

/// Parse a record read back by CHECK.
///
/// Empty numeric fields read as 0. An empty backend list is returned as-is;
/// the reconciler decides how to present it.
pub fn observe(record: &IpvsRecord) -> Result<ObservedVirtualServer, CoreError> {
    Ok(ObservedVirtualServer {
        address: record.ip.clone(),
        port: number("Port", &record.port)?,
        protocol: record.protocol.clone(),
        kind: record.lb_kind.clone(),
        algorithm: record.lb_algo.clone(),
        persistence_timeout: number("Persistence_timeout", &record.persistence_timeout)?,
        check_interval: number("Delay_loop", &record.delay_loop)?,
        sorry_address: record.sorry_ip.clone(),
        sorry_port: number("Sorry_port", &record.sorry_port)?,
        virtual_host: record.virtualhost.clone(),
        monitoring_period: record.mon_period.clone(),
        backends: record
            .backends
            .iter()
            .map(observe_backend)
            .collect::<Result<_, _>>()?,
    })
}
