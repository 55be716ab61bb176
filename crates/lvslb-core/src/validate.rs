// ── Local validation ──
//
// Runs on create and update before anything is sent to the endpoint.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::CoreError;
use crate::model::VirtualServer;

/// IP family of a virtual server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Strict dotted-quad parse decides IPv4; anything else counts as IPv6.
    pub fn of(address: &str) -> Self {
        if address.parse::<Ipv4Addr>().is_ok() {
            Self::V4
        } else {
            Self::V6
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => f.write_str("IPv4"),
            Self::V6 => f.write_str("IPv6"),
        }
    }
}

/// Reject any backend whose family differs from the virtual server's.
///
/// IPv4-mapped IPv6 backends (`::ffff:a.b.c.d`) count as IPv4: accepted for
/// IPv4 servers, rejected for IPv6 ones.
pub fn validate_address_family<'a, I>(vs_address: &str, backends: I) -> Result<(), CoreError>
where
    I: IntoIterator<Item = &'a str>,
{
    let expected = AddressFamily::of(vs_address);
    for address in backends {
        let ok = match expected {
            AddressFamily::V4 => {
                address.parse::<Ipv4Addr>().is_ok()
                    || address
                        .parse::<Ipv6Addr>()
                        .is_ok_and(|ip| ip.to_ipv4_mapped().is_some())
            }
            AddressFamily::V6 => {
                address.contains(':')
                    && address
                        .parse::<Ipv6Addr>()
                        .is_ok_and(|ip| ip.to_ipv4_mapped().is_none())
            }
        };
        if !ok {
            return Err(CoreError::AddressFamilyMismatch {
                address: address.to_owned(),
                expected,
            });
        }
    }
    Ok(())
}

fn check_range(field: &str, value: u32, min: u32, max: u32) -> Result<(), CoreError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::invalid(
            field,
            format!("{value} is outside {min}..={max}"),
        ))
    }
}

fn check_ip(field: &str, value: &str) -> Result<(), CoreError> {
    value
        .parse::<IpAddr>()
        .map(drop)
        .map_err(|_| CoreError::invalid(field, format!("{value:?} is not an IP address")))
}

/// Field-level checks: IP literals and numeric ranges.
pub fn validate_ranges(server: &VirtualServer) -> Result<(), CoreError> {
    check_ip("address", &server.address)?;
    if let Some(sorry) = server.sorry_address.as_deref().filter(|s| !s.is_empty()) {
        check_ip("sorry_address", sorry)?;
    }
    check_range("persistence_timeout", server.persistence_timeout, 0, 86_400)?;
    check_range("check_interval", server.check_interval, 1, 60)?;

    for (i, group) in server.backends.iter().enumerate() {
        let field = |name: &str| format!("backends[{i}].{name}");

        if group.addresses.is_empty() {
            return Err(CoreError::invalid(
                field("addresses"),
                "at least one address is required",
            ));
        }
        check_range(&field("weight"), group.weight, 1, 1000)?;
        if let Some(port) = group.check_port {
            check_range(&field("check_port"), u32::from(port), 1, 65_535)?;
        }
        check_range(&field("check_timeout"), group.check_timeout, 1, 60)?;
        check_range(&field("retries"), group.retries, 1, 10)?;
        check_range(&field("retry_delay"), group.retry_delay, 1, 60)?;
        if let Some(code) = group.status_code.filter(|c| *c != 0) {
            check_range(&field("status_code"), u32::from(code), 100, 599)?;
        }
    }
    Ok(())
}

/// Everything checked before a create or update is sent.
pub fn validate(server: &VirtualServer) -> Result<(), CoreError> {
    validate_ranges(server)?;
    validate_address_family(&server.address, server.backend_addresses())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::BackendGroup;

    #[test]
    fn family_detection() {
        assert_eq!(AddressFamily::of("10.0.0.1"), AddressFamily::V4);
        assert_eq!(AddressFamily::of("2001:db8::1"), AddressFamily::V6);
        assert_eq!(AddressFamily::of("010.0.0.1"), AddressFamily::V6);
    }

    #[test]
    fn single_family_pools_pass() {
        assert!(validate_address_family("10.0.0.1", ["10.0.1.1", "10.0.1.2"]).is_ok());
        assert!(validate_address_family("2001:db8::1", ["2001:db8::10", "fe80::1"]).is_ok());
        assert!(validate_address_family("10.0.0.1", []).is_ok());
    }

    #[test]
    fn ipv6_backend_rejected_for_ipv4_server() {
        let err = validate_address_family("10.0.0.1", ["10.0.1.1", "2001:db8::10"]).unwrap_err();
        match err {
            CoreError::AddressFamilyMismatch { address, expected } => {
                assert_eq!(address, "2001:db8::10");
                assert_eq!(expected, AddressFamily::V4);
            }
            other => panic!("expected AddressFamilyMismatch, got: {other:?}"),
        }
    }

    #[test]
    fn ipv4_backend_rejected_for_ipv6_server() {
        let err = validate_address_family("2001:db8::1", ["10.0.1.1"]).unwrap_err();
        assert!(err.to_string().contains("10.0.1.1"));
    }

    #[test]
    fn ipv4_mapped_backend_counts_as_ipv4() {
        assert!(validate_address_family("10.0.0.1", ["10.0.1.1", "::ffff:10.0.1.2"]).is_ok());
        assert!(validate_address_family("2001:db8::1", ["::ffff:10.0.1.1"]).is_err());
    }

    #[test]
    fn garbage_backend_rejected() {
        assert!(validate_address_family("10.0.0.1", ["backend-1"]).is_err());
        assert!(validate_address_family("2001:db8::1", ["backend:1"]).is_err());
    }

    #[test]
    fn defaults_pass_range_checks() {
        let vs = VirtualServer::new("10.0.0.1", 80).with_backend(BackendGroup::new(["10.0.1.1"]));
        assert!(validate(&vs).is_ok());
    }

    #[test]
    fn out_of_range_fields_named() {
        let mut group = BackendGroup::new(["10.0.1.1"]);
        group.weight = 0;
        let vs = VirtualServer::new("10.0.0.1", 80).with_backend(group);
        let err = validate_ranges(&vs).unwrap_err();
        assert_eq!(err.to_string(), "invalid backends[0].weight: 0 is outside 1..=1000");

        let mut vs = VirtualServer::new("10.0.0.1", 80);
        vs.check_interval = 61;
        assert!(validate_ranges(&vs).is_err());

        let mut vs = VirtualServer::new("10.0.0.1", 80);
        vs.persistence_timeout = 86_401;
        assert!(validate_ranges(&vs).is_err());
    }

    #[test]
    fn status_code_zero_means_unset() {
        let mut group = BackendGroup::new(["10.0.1.1"]);
        group.status_code = Some(0);
        let vs = VirtualServer::new("10.0.0.1", 80).with_backend(group.clone());
        assert!(validate_ranges(&vs).is_ok());

        group.status_code = Some(99);
        let vs = VirtualServer::new("10.0.0.1", 80).with_backend(group);
        assert!(validate_ranges(&vs).is_err());
    }

    #[test]
    fn empty_group_and_bad_address_rejected() {
        let vs = VirtualServer::new("10.0.0.1", 80).with_backend(BackendGroup::new(Vec::<String>::new()));
        assert!(validate_ranges(&vs).is_err());

        let vs = VirtualServer::new("lb.example.net", 80);
        assert!(validate_ranges(&vs).is_err());

        let mut vs = VirtualServer::new("10.0.0.1", 80);
        vs.sorry_address = Some("sorry".into());
        assert!(validate_ranges(&vs).is_err());
    }
}
